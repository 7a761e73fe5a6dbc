//! Shared configuration primitives for the hotel services.
//!
//! Every config struct in the workspace is loaded from environment variables
//! through the [`FromEnv`] trait, using the helpers in this crate so missing
//! and malformed values produce the same [`ConfigError`] messages everywhere.

pub mod server;
pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid configuration for '{key}': {details}")]
    Invalid { key: String, details: String },
}

/// Application environment
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Reads `APP_ENV`; anything other than "production" is development.
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Static identity of a running binary, reported by the health endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Build an [`AppInfo`] from the calling crate's Cargo metadata.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    };
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Helper to load an environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// A value that is set but fails to parse is an error rather than a silent
/// fallback.
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean flag. Accepts true/false, 1/0, yes/no, on/off.
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("HOTELS_TEST_VAR", Some("set"), || {
            assert_eq!(env_or_default("HOTELS_TEST_VAR", "fallback"), "set");
        });
        temp_env::with_var_unset("HOTELS_TEST_VAR", || {
            assert_eq!(env_or_default("HOTELS_TEST_VAR", "fallback"), "fallback");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("HOTELS_MISSING_REQUIRED", || {
            let err = env_required("HOTELS_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("HOTELS_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_parse_uses_default_when_unset() {
        temp_env::with_var_unset("HOTELS_DIM", || {
            assert_eq!(env_parse("HOTELS_DIM", 384usize).unwrap(), 384);
        });
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        temp_env::with_var("HOTELS_DIM", Some("lots"), || {
            let err = env_parse("HOTELS_DIM", 384usize).unwrap_err();
            assert!(err.to_string().contains("HOTELS_DIM"));
        });
    }

    #[test]
    fn test_env_flag_variants() {
        temp_env::with_var("HOTELS_FLAG", Some("off"), || {
            assert!(!env_flag("HOTELS_FLAG", true).unwrap());
        });
        temp_env::with_var("HOTELS_FLAG", Some("YES"), || {
            assert!(env_flag("HOTELS_FLAG", false).unwrap());
        });
        temp_env::with_var("HOTELS_FLAG", Some("maybe"), || {
            assert!(env_flag("HOTELS_FLAG", false).is_err());
        });
    }

    #[test]
    fn test_app_info_macro_reads_package_metadata() {
        let info = app_info!();
        assert_eq!(info.name, "core_config");
        assert!(!info.version.is_empty());
    }
}
