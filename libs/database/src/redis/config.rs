#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv};

/// Connection settings for a Redis Stack server.
///
/// Credentials and database number are kept apart from the base URL and
/// folded in by [`RedisConfig::build_url`], so secrets can come from their
/// own environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedisConfig {
    /// Base URL, e.g. `redis://127.0.0.1:6379`
    pub url: String,
    pub database: Option<u8>,
    /// ACL username (Redis 6+)
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: None,
            username: None,
            password: None,
        }
    }

    pub fn with_auth(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn with_database(mut self, database: u8) -> Self {
        self.database = Some(database);
        self
    }

    /// Full connection URL with credentials and database applied.
    ///
    /// Values already present in `url` win over the separate fields.
    pub fn build_url(&self) -> String {
        let (scheme, rest) = match self.url.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => ("redis", self.url.as_str()),
        };
        let (authority, path) = match rest.split_once('/') {
            Some((authority, path)) => (authority, Some(path)),
            None => (rest, None),
        };

        let authority = if authority.contains('@') {
            authority.to_string()
        } else {
            match (&self.username, &self.password) {
                (Some(user), Some(pass)) => format!("{user}:{pass}@{authority}"),
                (None, Some(pass)) => format!(":{pass}@{authority}"),
                (Some(user), None) => format!("{user}@{authority}"),
                (None, None) => authority.to_string(),
            }
        };

        match (path.filter(|p| !p.is_empty()), self.database) {
            (Some(path), _) => format!("{scheme}://{authority}/{path}"),
            (None, Some(db)) => format!("{scheme}://{authority}/{db}"),
            (None, None) => format!("{scheme}://{authority}"),
        }
    }

    /// URL safe to print: the password is masked.
    pub fn redacted_url(&self) -> String {
        let url = self.build_url();
        let Some((scheme, rest)) = url.split_once("://") else {
            return url;
        };
        match rest.split_once('@') {
            Some((userinfo, host)) => match userinfo.split_once(':') {
                Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
                None => format!("{scheme}://{userinfo}@{host}"),
            },
            None => url,
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

/// Environment variables:
/// - `REDIS_URL` or `REDIS_HOST` (required)
/// - `REDIS_DATABASE` (optional, 0-15)
/// - `REDIS_USERNAME` / `REDIS_PASSWORD` (optional)
#[cfg(feature = "config")]
impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("REDIS_URL")
            .or_else(|_| std::env::var("REDIS_HOST"))
            .map_err(|_| ConfigError::MissingEnvVar("REDIS_URL or REDIS_HOST".to_string()))?;

        let database = match std::env::var("REDIS_DATABASE") {
            Ok(raw) => Some(raw.parse::<u8>().map_err(|e| ConfigError::ParseError {
                key: "REDIS_DATABASE".to_string(),
                details: e.to_string(),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            url,
            database,
            username: std::env::var("REDIS_USERNAME").ok(),
            password: std::env::var("REDIS_PASSWORD").ok(),
        })
    }
}
