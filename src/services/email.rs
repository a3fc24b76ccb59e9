use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::{config::Config, services::metrics::EMAILS_FAILED_COUNTER};

const FOUNDATION_NAME: &str = "TaeTae Foundation";

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

/// Record a failed send. Email is never allowed to fail the request that triggered it.
pub fn log_failure(kind: &str, to: &str, err: &anyhow::Error) {
    EMAILS_FAILED_COUNTER.with_label_values(&[kind]).inc();
    tracing::warn!("Failed to send {kind} email to {to}: {err:#}");
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Crude text alternative for an HTML body.
fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

impl EmailService {
    /// Returns None if SMTP is not fully configured.
    pub fn new(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let username = config.smtp_username.clone()?;
        let password = config.smtp_password.clone()?;
        let from_addr = config.smtp_from.as_deref()?;

        let port = config.smtp_port.unwrap_or(587);
        let creds = Credentials::new(username, password);

        let transport = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .ok()?
                .port(port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .ok()?
                .port(port)
                .credentials(creds)
                .build()
        };

        let from: Mailbox = from_addr.parse().ok()?;

        Some(Self { transport, from })
    }

    // ─── Private helpers ─────────────────────────────────────────────────────

    fn new_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    /// Wraps inner HTML content in the foundation's email layout.
    fn wrap_html(content: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width,initial-scale=1">
  <title>{FOUNDATION_NAME}</title>
</head>
<body style="margin:0;padding:0;background-color:#f1f5f9;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif">
  <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background-color:#f1f5f9;padding:40px 16px">
    <tr>
      <td align="center">
        <table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="max-width:520px">
          <tr>
            <td align="center" style="padding-bottom:28px">
              <p style="margin:0;font-size:20px;font-weight:700;color:#0f172a;text-align:center">{FOUNDATION_NAME}</p>
            </td>
          </tr>
          <tr>
            <td style="background:#ffffff;border-radius:12px;padding:40px;box-shadow:0 1px 3px rgba(0,0,0,0.08),0 8px 24px rgba(0,0,0,0.04)">
              {content}
            </td>
          </tr>
          <tr>
            <td align="center" style="padding-top:20px">
              <p style="margin:0;font-size:12px;color:#94a3b8">{FOUNDATION_NAME}</p>
            </td>
          </tr>
        </table>
      </td>
    </tr>
  </table>
</body>
</html>"#
        )
    }

    fn content(title: &str, paragraphs: &[String]) -> String {
        let mut out = format!(
            r#"<h1 style="margin:0 0 8px 0;font-size:22px;font-weight:700;color:#0f172a">{}</h1>"#,
            escape_html(title)
        );
        for p in paragraphs {
            out.push_str(&format!(
                r#"
<p style="margin:0 0 16px 0;font-size:15px;color:#64748b;line-height:1.6">{p}</p>"#
            ));
        }
        out
    }

    // ─── Public methods ───────────────────────────────────────────────────────

    /// Send a single HTML email with a derived plain-text alternative.
    pub async fn send_email(&self, to_email: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let from = Mailbox::new(Some(FOUNDATION_NAME.to_string()), self.from.email.clone());
        let to: Mailbox = to_email
            .parse()
            .with_context(|| format!("Invalid recipient address: {to_email}"))?;

        let email = Message::builder()
            .message_id(Some(self.new_message_id()))
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(html_to_text(html)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.to_string()),
                    ),
            )
            .context("Failed to build email message")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send email")?;

        Ok(())
    }

    pub async fn send_volunteer_application_received(
        &self,
        to_email: &str,
        name: &str,
    ) -> anyhow::Result<()> {
        let content = Self::content(
            "Thank you for applying",
            &[
                format!("Hello <strong style=\"color:#334155\">{}</strong>,", escape_html(name)),
                "We have received your application to volunteer with the foundation. \
                 Our team will review it and get back to you shortly."
                    .to_string(),
            ],
        );
        let html = Self::wrap_html(&content);
        self.send_email(to_email, "We received your volunteer application", &html)
            .await
    }

    pub async fn send_new_volunteer_alert(
        &self,
        admin_email: &str,
        name: &str,
        applicant_email: &str,
        category: &str,
    ) -> anyhow::Result<()> {
        let content = Self::content(
            "New volunteer application",
            &[
                format!(
                    "<strong style=\"color:#334155\">{}</strong> ({}) applied as a <strong>{}</strong> volunteer.",
                    escape_html(name),
                    escape_html(applicant_email),
                    escape_html(category)
                ),
                "Review the application from the admin dashboard.".to_string(),
            ],
        );
        let html = Self::wrap_html(&content);
        self.send_email(admin_email, &format!("New volunteer application: {name}"), &html)
            .await
    }

    pub async fn send_volunteer_decision(
        &self,
        to_email: &str,
        name: &str,
        approved: bool,
    ) -> anyhow::Result<()> {
        let (subject, body) = if approved {
            (
                "Your volunteer application was approved",
                "Welcome aboard! Your application has been approved and our team will contact you about your first sessions.",
            )
        } else {
            (
                "Update on your volunteer application",
                "Thank you for your interest. Unfortunately we are unable to accept your application at this time.",
            )
        };
        let content = Self::content(
            subject,
            &[
                format!("Hello <strong style=\"color:#334155\">{}</strong>,", escape_html(name)),
                body.to_string(),
            ],
        );
        let html = Self::wrap_html(&content);
        self.send_email(to_email, subject, &html).await
    }

    pub async fn send_donation_thank_you(
        &self,
        to_email: &str,
        donor_name: Option<&str>,
        amount: f64,
        currency: &str,
        program: &str,
    ) -> anyhow::Result<()> {
        let greeting = donor_name
            .map(|n| format!("Dear <strong style=\"color:#334155\">{}</strong>,", escape_html(n)))
            .unwrap_or_else(|| "Dear friend,".to_string());
        let content = Self::content(
            "Thank you for your donation",
            &[
                greeting,
                format!(
                    "We have recorded your gift of <strong>{} {:.2}</strong> to our <strong>{}</strong> program.",
                    escape_html(currency),
                    amount,
                    escape_html(program)
                ),
                "Your generosity changes lives.".to_string(),
            ],
        );
        let html = Self::wrap_html(&content);
        self.send_email(to_email, "Thank you for your donation", &html)
            .await
    }

    pub async fn send_sponsorship_thank_you(
        &self,
        to_email: &str,
        sponsor_name: &str,
        amount: f64,
        currency: &str,
    ) -> anyhow::Result<()> {
        let content = Self::content(
            "Thank you for your sponsorship",
            &[
                format!("Dear <strong style=\"color:#334155\">{}</strong>,", escape_html(sponsor_name)),
                format!(
                    "We have recorded your sponsorship of <strong>{} {:.2}</strong>. We will keep you updated on the boys you support.",
                    escape_html(currency),
                    amount
                ),
            ],
        );
        let html = Self::wrap_html(&content);
        self.send_email(to_email, "Thank you for your sponsorship", &html)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrusted_names_are_escaped() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn text_alternative_drops_markup() {
        let html = EmailService::content(
            "Thank you",
            &["Hello <strong>Ade &amp; family</strong>,".to_string()],
        );
        assert_eq!(html_to_text(&html), "Thank you\nHello Ade & family,");
    }

    #[test]
    fn email_is_disabled_without_smtp() {
        let config = Config::for_tests("key");
        assert!(EmailService::new(&config).is_none());
    }
}
