use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub admin_api_key: String,
    pub app_base_url: String,
    pub admin_notification_email: Option<String>,
    pub stats_top_n: usize,
    pub default_currency: String,
    // SMTP (optional)
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    // Cloudinary (optional)
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .to_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => anyhow::bail!("Unknown STORE_BACKEND: {other}"),
        };

        let database_url = match store_backend {
            StoreBackend::Postgres => Some(required("DATABASE_URL")?),
            StoreBackend::Memory => optional("DATABASE_URL"),
        };

        Ok(Self {
            store_backend,
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            admin_api_key: required("ADMIN_API_KEY")?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            admin_notification_email: optional("ADMIN_NOTIFICATION_EMAIL"),
            stats_top_n: env::var("STATS_TOP_N")
                .unwrap_or_else(|_| "5".into())
                .parse()?,
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "NGN".into()),
            smtp_host: optional("SMTP_HOST"),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|v| v.parse().ok()),
            smtp_username: optional("SMTP_USERNAME"),
            smtp_password: optional("SMTP_PASSWORD"),
            smtp_from: optional("SMTP_FROM"),
            cloudinary_cloud_name: optional("CLOUDINARY_CLOUD_NAME"),
            cloudinary_api_key: optional("CLOUDINARY_API_KEY"),
            cloudinary_api_secret: optional("CLOUDINARY_API_SECRET"),
        })
    }

    /// In-memory configuration with every external collaborator disabled.
    pub fn for_tests(admin_api_key: &str) -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            admin_api_key: admin_api_key.to_string(),
            app_base_url: "http://localhost:3000".into(),
            admin_notification_email: None,
            stats_top_n: 5,
            default_currency: "NGN".into(),
            smtp_host: None,
            smtp_port: None,
            smtp_username: None,
            smtp_password: None,
            smtp_from: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
        }
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
