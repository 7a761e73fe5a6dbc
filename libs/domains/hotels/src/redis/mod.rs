//! Redis Stack backend: RedisJSON documents plus a RediSearch vector index.

mod index;
mod reply;
mod repository;

pub use index::RedisVectorIndex;
pub use repository::RedisHotelRepository;

/// Modules the Redis backend needs loaded on the server
pub const REQUIRED_MODULES: &[&str] = &["search", "ReJSON"];
