//! Shared application state passed to the routers.

use domain_hotels::{HotelService, RedisHotelRepository, RedisVectorIndex};

pub type Hotels = HotelService<RedisHotelRepository, RedisVectorIndex>;

/// Cloned per router; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Redis connection manager (multiplexed, reconnects on its own)
    pub redis: database::redis::ConnectionManager,
    pub hotels: Hotels,
}
