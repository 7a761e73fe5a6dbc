/// Errors raised while establishing or probing store connections.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
