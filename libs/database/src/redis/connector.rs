use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::RedisConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Open a [`ConnectionManager`] and verify it with `PING`.
///
/// The manager reconnects on its own after the initial handshake, so a
/// single instance is cloned into every repository that needs it.
pub async fn connect(config: &RedisConfig) -> redis::RedisResult<ConnectionManager> {
    info!(url = %config.redacted_url(), "Connecting to Redis");

    let client = Client::open(config.build_url())?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Connected to Redis");
    Ok(manager)
}

/// [`connect`] with exponential backoff, for startup ordering against a
/// store container that may still be booting.
///
/// ```ignore
/// let retry = RetryConfig::new().with_max_retries(5);
/// let conn = connect_with_retry(&RedisConfig::from_env()?, Some(retry)).await?;
/// ```
pub async fn connect_with_retry(
    config: &RedisConfig,
    retry_config: Option<RetryConfig>,
) -> redis::RedisResult<ConnectionManager> {
    retry_with_backoff(|| connect(config), retry_config.unwrap_or_default()).await
}
