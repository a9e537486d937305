use crate::config::get_config;
use crate::error::{Error, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};

/// Connects with bounded, fixed-delay retries. The database container may
/// come up after the backend; retry happens here at startup only, never
/// per-request.
pub async fn create_pool() -> Result<PgPool> {
    let config = get_config();
    let attempts = config.db_connect_attempts.max(1);
    let delay = Duration::from_secs(config.db_connect_retry_secs);

    for attempt in 1..=attempts {
        match PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "database connected");
                return Ok(pool);
            }
            Err(err) if attempt < attempts => {
                warn!(attempt, max_attempts = attempts, error = %err, "database connection failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(err) => {
                return Err(Error::Internal(format!(
                    "database unreachable after {} attempts: {}",
                    attempts, err
                )));
            }
        }
    }
    unreachable!("retry loop returns on the last attempt")
}
