use crate::{
    models::{
        boy::ProgramTrack,
        donation::{CreateDonationRequest, Donation},
    },
    services::{
        blank_to_none,
        email::{log_failure, EmailService},
        invalid, metrics::DONATION_AMOUNT_COUNTER,
        non_blank,
        records::RecordService,
        ServiceResult,
    },
    store::{collections, Document, RecordStore},
};

pub struct DonationService;

impl DonationService {
    /// Record a donation intent. Anonymous donations keep no donor identity.
    pub async fn record(
        store: &dyn RecordStore,
        email: Option<&EmailService>,
        default_currency: &str,
        req: CreateDonationRequest,
    ) -> ServiceResult<Document> {
        // Known tracks only: the program is a metric label.
        let program: ProgramTrack = non_blank(&req.program, "program")?
            .parse()
            .map_err(|_| invalid(format!("Unknown program: {}", req.program.trim())))?;
        if !req.amount.is_finite() || req.amount <= 0.0 {
            return Err(invalid("amount must be greater than zero"));
        }

        let (donor_name, donor_email) = if req.anonymous {
            (None, None)
        } else {
            (
                blank_to_none(req.donor_name),
                blank_to_none(req.email).map(|e| e.to_lowercase()),
            )
        };

        let donation = Donation {
            donor_name,
            email: donor_email,
            anonymous: req.anonymous,
            program: program.to_string(),
            amount: req.amount,
            currency: blank_to_none(req.currency)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| default_currency.to_string()),
            payment_method: blank_to_none(req.payment_method),
            status: req.status.unwrap_or_default(),
        };

        let doc = RecordService::create(store, collections::DONATIONS, &donation).await?;
        DONATION_AMOUNT_COUNTER
            .with_label_values(&[&donation.program])
            .inc_by(donation.amount);

        if let (Some(email), Some(to)) = (email, donation.email.as_deref()) {
            if let Err(e) = email
                .send_donation_thank_you(
                    to,
                    donation.donor_name.as_deref(),
                    donation.amount,
                    &donation.currency,
                    &donation.program,
                )
                .await
            {
                log_failure("donation_thank_you", to, &e);
            }
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{services::ServiceError, store::MemoryRecordStore};
    use serde_json::{json, Value};

    fn request(body: Value) -> CreateDonationRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn anonymous_donations_drop_identity() {
        let store = MemoryRecordStore::new();
        let doc = DonationService::record(
            &store,
            None,
            "NGN",
            request(json!({
                "donor_name": "Hidden Person",
                "email": "hidden@example.org",
                "anonymous": "true",
                "program": "Education",
                "amount": "2500"
            })),
        )
        .await
        .unwrap();
        assert_eq!(doc["donor_name"], Value::Null);
        assert_eq!(doc["email"], Value::Null);
        assert_eq!(doc["anonymous"], true);
        assert_eq!(doc["program"], "education");
        assert_eq!(doc["amount"], 2500.0);
        assert_eq!(doc["currency"], "NGN");
        assert_eq!(doc["status"], "pending");
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let store = MemoryRecordStore::new();
        for amount in [json!(0), json!(-5)] {
            let err = DonationService::record(
                &store,
                None,
                "NGN",
                request(json!({ "program": "sports", "amount": amount })),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::Invalid(_)));
        }
        assert!(store.get_records("donations", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_programs_are_rejected_before_saving() {
        let store = MemoryRecordStore::new();
        for program in ["junk-0", "general", "sports; drop"] {
            let err = DonationService::record(
                &store,
                None,
                "NGN",
                request(json!({ "program": program, "amount": 10 })),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ServiceError::Invalid(ref m) if m.starts_with("Unknown program")));
        }
        assert!(store.get_records("donations", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_currency_is_kept() {
        let store = MemoryRecordStore::new();
        let doc = DonationService::record(
            &store,
            None,
            "NGN",
            request(json!({
                "donor_name": "Ada",
                "email": "ADA@example.org",
                "program": "skills",
                "amount": 40,
                "currency": "usd",
                "status": "completed"
            })),
        )
        .await
        .unwrap();
        assert_eq!(doc["currency"], "USD");
        assert_eq!(doc["email"], "ada@example.org");
        assert_eq!(doc["status"], "completed");
    }
}
