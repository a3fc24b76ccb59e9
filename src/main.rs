use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taetae_api::{
    build_router,
    config::{Config, StoreBackend},
    db,
    store::{MemoryRecordStore, PgRecordStore, RecordStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let pool = db::create_pool(url).await?;
            db::provision_records_table(&pool).await?;
            info!("Database connected and records table provisioned");
            Arc::new(PgRecordStore::new(pool))
        }
        StoreBackend::Memory => {
            info!("Using in-memory record store; data is lost on restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let state = AppState::new(store, config.clone());
    if state.email.is_some() {
        info!("SMTP email service configured");
    } else {
        info!("SMTP not configured, email notifications disabled");
    }
    if state.storage.is_some() {
        info!("Cloud storage configured");
    } else {
        info!("Cloud storage not configured, file uploads disabled");
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("TaeTae API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
