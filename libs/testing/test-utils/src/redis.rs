//! Redis Stack test infrastructure
//!
//! Provides a `TestRedis` helper that starts a Redis Stack container (RedisJSON
//! and RediSearch loaded) for testing.

use redis::Client;
use redis::aio::ConnectionManager;
use testcontainers::ContainerAsync;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::{REDIS_PORT, RedisStack};

/// Test Redis wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestRedis;
///
/// # async fn example() {
/// let redis = TestRedis::new().await;
/// let conn = redis.connection();
/// // Hand conn to a repository or index
/// # }
/// ```
pub struct TestRedis {
    #[allow(dead_code)]
    container: ContainerAsync<RedisStack>,
    connection: ConnectionManager,
    pub connection_string: String,
}

impl TestRedis {
    /// Start a Redis Stack container and connect to it
    pub async fn new() -> Self {
        let container = RedisStack::default()
            .start()
            .await
            .expect("Failed to start Redis Stack container");

        let host_port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("Failed to get Redis port");

        let connection_string = format!("redis://127.0.0.1:{}", host_port);

        let client =
            Client::open(connection_string.clone()).expect("Failed to create Redis client");

        let connection = ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis");

        tracing::info!(port = host_port, "Test Redis ready (redis-stack)");

        Self {
            container,
            connection,
            connection_string,
        }
    }

    /// Get a cloned connection (useful for passing to services)
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    /// Get the connection string for manual client creation
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

// Container is automatically cleaned up when TestRedis is dropped
impl Drop for TestRedis {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Redis container");
    }
}
