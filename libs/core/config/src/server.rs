use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP listener configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single request; the handler future is dropped when it expires.
    pub request_timeout: Duration,
    /// Allowed CORS origins; empty means any origin is accepted.
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            request_timeout: Duration::from_secs(30),
            cors_allowed_origins: Vec::new(),
        }
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// - HOST: defaults to 0.0.0.0
    /// - PORT: defaults to 8080
    /// - REQUEST_TIMEOUT_SECS: defaults to 30
    /// - CORS_ALLOWED_ORIGIN: comma separated origins, optional
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_parse("PORT", 8080u16)?;
        let timeout_secs = env_parse("REQUEST_TIMEOUT_SECS", 30u64)?;

        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "REQUEST_TIMEOUT_SECS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        let cors_allowed_origins = env_or_default("CORS_ALLOWED_ORIGIN", "")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            cors_allowed_origins,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED.to_string(), 8080)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_env_with_defaults() {
        temp_env::with_vars(
            [
                ("HOST", None::<&str>),
                ("PORT", None::<&str>),
                ("REQUEST_TIMEOUT_SECS", None::<&str>),
                ("CORS_ALLOWED_ORIGIN", None::<&str>),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "0.0.0.0:8080");
                assert_eq!(config.request_timeout, Duration::from_secs(30));
                assert!(config.cors_allowed_origins.is_empty());
            },
        );
    }

    #[test]
    fn test_server_config_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("3000")),
                ("REQUEST_TIMEOUT_SECS", Some("5")),
                (
                    "CORS_ALLOWED_ORIGIN",
                    Some("http://localhost:3000, https://hotels.example.com,"),
                ),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "127.0.0.1:3000");
                assert_eq!(config.request_timeout, Duration::from_secs(5));
                assert_eq!(
                    config.cors_allowed_origins,
                    vec!["http://localhost:3000", "https://hotels.example.com"]
                );
            },
        );
    }

    #[test]
    fn test_server_config_port_out_of_range() {
        temp_env::with_var("PORT", Some("99999"), || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }

    #[test]
    fn test_server_config_zero_timeout_rejected() {
        temp_env::with_vars(
            [("PORT", None::<&str>), ("REQUEST_TIMEOUT_SECS", Some("0"))],
            || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("REQUEST_TIMEOUT_SECS"));
            },
        );
    }
}
