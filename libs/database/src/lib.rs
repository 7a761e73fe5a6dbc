//! Connection management for the document store backing the hotel services.
//!
//! # Features
//!
//! - `redis` (default) - Redis / Redis Stack connector and health checks
//! - `config` - `core_config::FromEnv` support for [`redis::RedisConfig`]
//!
//! # Example
//!
//! ```ignore
//! use database::redis::{RedisConfig, connect_with_retry};
//!
//! let config = RedisConfig::new("redis://127.0.0.1:6379");
//! let conn = connect_with_retry(&config, None).await?;
//! ```

pub mod common;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult};
