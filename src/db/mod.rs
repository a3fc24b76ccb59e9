use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the shared document table and its indexes (idempotent, safe on every startup).
pub async fn provision_records_table(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::raw_sql(
        r#"CREATE TABLE IF NOT EXISTS records (
            seq         BIGSERIAL,
            collection  TEXT NOT NULL,
            id          TEXT NOT NULL,
            doc         JSONB NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (collection, id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::raw_sql("CREATE INDEX IF NOT EXISTS records_collection_seq_idx ON records (collection, seq)")
        .execute(pool)
        .await?;

    sqlx::raw_sql("CREATE INDEX IF NOT EXISTS records_doc_gin_idx ON records USING GIN (doc jsonb_path_ops)")
        .execute(pool)
        .await?;

    tracing::info!("Provisioned records table");
    Ok(())
}
