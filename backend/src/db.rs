//! Database pool and the transaction boundary coordinator

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use crate::config::{DatabaseConfig, RetryConfig};
use crate::error::{AppError, AppResult};

/// Future returned by an operation running inside a transaction
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'c>>;

/// Create the connection pool
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.url)
        .await?;
    Ok(pool)
}

/// Run pending schema migrations
pub async fn migrate(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Run one logical operation as a single atomic unit
///
/// The closure receives an open transaction; on success every mutation
/// commits together, on failure the transaction rolls back and no partial
/// state is observable. Transient storage failures are retried with
/// exponential backoff up to `retry.max_attempts`; business-rule failures
/// surface immediately.
pub async fn run_atomic<T, F>(pool: &PgPool, retry: RetryConfig, mut op: F) -> AppResult<T>
where
    F: AsyncFnMut(&mut Transaction<'static, Postgres>) -> AppResult<T>,
{
    let mut attempt: u32 = 1;
    loop {
        let outcome = async {
            let mut tx = pool.begin().await?;
            let value = op(&mut tx).await?;
            tx.commit().await?;
            Ok::<T, AppError>(value)
        }
        .await;

        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                let delay = Duration::from_millis(retry.base_delay_ms << (attempt - 1));
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient storage failure, retrying atomic unit"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
