use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::redis::RedisConfig;
use domain_hotels::HotelsConfig;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub hotels: HotelsConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080
        let redis = RedisConfig::from_env()?; // Required
        let hotels = HotelsConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            redis,
            server,
            hotels,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_requires_redis() {
        temp_env::with_vars(
            [("REDIS_URL", None::<&str>), ("REDIS_HOST", None)],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("REDIS_URL"));
            },
        );
    }

    #[test]
    fn test_from_env_composes_sections() {
        temp_env::with_vars(
            [
                ("REDIS_URL", Some("redis://cache:6379")),
                ("PORT", Some("9090")),
                ("HOTELS_VECTOR_DIMENSION", Some("768")),
                ("EMBEDDING_PROVIDER", None),
                ("EMBEDDING_MODEL", Some("all-mpnet-base-v2")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.redis.url, "redis://cache:6379");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.hotels.index.dimension, 768);
                assert_eq!(config.app.name, "hotels_api");
            },
        );
    }
}
