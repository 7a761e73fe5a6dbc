//! Redis Stack connector and health checks

mod config;
mod connector;
mod health;

pub use config::RedisConfig;
pub use connector::{connect, connect_with_retry};
pub use health::{HealthStatus, check_health, check_health_detailed, check_modules};

pub use redis::aio::ConnectionManager;
pub use redis::{AsyncCommands, Client, RedisResult};
