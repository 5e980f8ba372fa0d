use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::info;

use super::collection::StoreError;

/// Process-wide Postgres pool, created lazily from `DATABASE_URL`.
pub struct StoreManager;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

impl StoreManager {
    pub async fn pool() -> Result<PgPool, StoreError> {
        let pool = POOL
            .get_or_try_init(|| async {
                let connection_string = Self::connection_string()?;
                let db_config = &crate::config::config().database;

                let pool = PgPoolOptions::new()
                    .max_connections(db_config.max_connections)
                    .acquire_timeout(Duration::from_secs(db_config.connect_timeout_secs))
                    .connect(&connection_string)
                    .await?;

                info!("Created database pool");
                Ok::<_, StoreError>(pool)
            })
            .await?;

        Ok(pool.clone())
    }

    fn connection_string() -> Result<String, StoreError> {
        let base =
            std::env::var("DATABASE_URL").map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

        let mut url = url::Url::parse(&base).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        // Optional override of the database name in the URL path
        if let Ok(name) = std::env::var("PAWHAVEN_DB_NAME") {
            url.set_path(&format!("/{}", name));
        }

        Ok(url.to_string())
    }
}
