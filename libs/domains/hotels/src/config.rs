//! Environment-driven configuration for the hotels domain.

use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse};
use std::path::PathBuf;

use crate::models::DistanceMetric;

pub const DEFAULT_INDEX_NAME: &str = "hotel_idx";
pub const DEFAULT_KEY_PREFIX: &str = "hotel:";
pub const DEFAULT_DIMENSION: usize = 384;
pub const DEFAULT_SIMILAR_K: usize = 3;
pub const DEFAULT_FIXTURE_PATH: &str = "data/hotels.json";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DUPLICATE_NAME_THRESHOLD: f32 = 0.8;

/// Vector index layout: name, key prefix, vector dimension and metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorIndexConfig {
    pub index_name: String,
    pub key_prefix: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            dimension: DEFAULT_DIMENSION,
            metric: DistanceMetric::Cosine,
        }
    }
}

impl VectorIndexConfig {
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }
}

impl FromEnv for VectorIndexConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dimension = env_parse("HOTELS_VECTOR_DIMENSION", DEFAULT_DIMENSION)?;
        if dimension == 0 {
            return Err(ConfigError::Invalid {
                key: "HOTELS_VECTOR_DIMENSION".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        let key_prefix = env_or_default("HOTELS_KEY_PREFIX", DEFAULT_KEY_PREFIX);
        if key_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                key: "HOTELS_KEY_PREFIX".to_string(),
                details: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            index_name: env_or_default("HOTELS_INDEX_NAME", DEFAULT_INDEX_NAME),
            key_prefix,
            dimension,
            metric: env_parse("HOTELS_DISTANCE_METRIC", DistanceMetric::Cosine)?,
        })
    }
}

/// Which embedding backend to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmbeddingProviderKind {
    /// OpenAI-compatible `/embeddings` endpoint
    OpenAI,
    /// Local ONNX model (the `fastembed` feature, on by default)
    #[default]
    FastEmbed,
    /// Deterministic hashed bag-of-words, for development and tests
    Hash,
}

impl EmbeddingProviderKind {
    /// Model used when `EMBEDDING_MODEL` is unset
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => DEFAULT_OPENAI_MODEL,
            Self::FastEmbed => DEFAULT_EMBEDDING_MODEL,
            Self::Hash => "hash",
        }
    }
}

/// Native output dimension of the local models fastembed can load.
pub fn local_model_dimension(model: &str) -> Option<usize> {
    match model.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => Some(384),
        "all-mpnet-base-v2" | "sentence-transformers/all-mpnet-base-v2" => Some(768),
        "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => Some(384),
        "bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => Some(768),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::for_provider(EmbeddingProviderKind::default())
    }
}

impl EmbeddingConfig {
    /// `provider` with its default model
    pub fn for_provider(provider: EmbeddingProviderKind) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
        }
    }

    /// Reject model/dimension pairs that cannot work together. Local models
    /// have a fixed output size; remote and hash providers are sized by the
    /// request.
    pub fn check_dimension(&self, dimension: usize) -> Result<(), ConfigError> {
        if self.provider != EmbeddingProviderKind::FastEmbed {
            return Ok(());
        }

        match local_model_dimension(&self.model) {
            Some(native) if native == dimension => Ok(()),
            Some(native) => Err(ConfigError::Invalid {
                key: "HOTELS_VECTOR_DIMENSION".to_string(),
                details: format!(
                    "model '{}' produces {}-dimensional vectors, got {}",
                    self.model, native, dimension
                ),
            }),
            None => Err(ConfigError::Invalid {
                key: "EMBEDDING_MODEL".to_string(),
                details: format!("'{}' is not a supported local model", self.model),
            }),
        }
    }
}

impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider: EmbeddingProviderKind =
            env_parse("EMBEDDING_PROVIDER", EmbeddingProviderKind::default())?;
        let defaults = Self::for_provider(provider);
        let api_key = std::env::var("EMBEDDING_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Self {
            provider,
            model: env_or_default("EMBEDDING_MODEL", &defaults.model),
            base_url: env_or_default("EMBEDDING_BASE_URL", &defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            api_key,
        })
    }
}

/// Everything the hotels domain reads from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct HotelsConfig {
    pub index: VectorIndexConfig,
    pub embedding: EmbeddingConfig,
    pub similar_default_k: usize,
    pub reembed_on_update: bool,
    /// Name similarity at which a neighbor is reported as a likely duplicate
    pub duplicate_name_threshold: f32,
    pub fixture_path: PathBuf,
}

impl Default for HotelsConfig {
    fn default() -> Self {
        Self {
            index: VectorIndexConfig::default(),
            embedding: EmbeddingConfig::default(),
            similar_default_k: DEFAULT_SIMILAR_K,
            reembed_on_update: true,
            duplicate_name_threshold: DEFAULT_DUPLICATE_NAME_THRESHOLD,
            fixture_path: PathBuf::from(DEFAULT_FIXTURE_PATH),
        }
    }
}

impl FromEnv for HotelsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let similar_default_k = env_parse("HOTELS_SIMILAR_DEFAULT_K", DEFAULT_SIMILAR_K)?;
        if similar_default_k == 0 || similar_default_k > crate::models::MAX_SIMILAR_K {
            return Err(ConfigError::Invalid {
                key: "HOTELS_SIMILAR_DEFAULT_K".to_string(),
                details: format!("must be between 1 and {}", crate::models::MAX_SIMILAR_K),
            });
        }

        let duplicate_name_threshold = env_parse(
            "HOTELS_DUPLICATE_NAME_THRESHOLD",
            DEFAULT_DUPLICATE_NAME_THRESHOLD,
        )?;
        if !(0.0..=1.0).contains(&duplicate_name_threshold) {
            return Err(ConfigError::Invalid {
                key: "HOTELS_DUPLICATE_NAME_THRESHOLD".to_string(),
                details: "must be between 0 and 1".to_string(),
            });
        }

        let index = VectorIndexConfig::from_env()?;
        let embedding = EmbeddingConfig::from_env()?;
        embedding.check_dimension(index.dimension)?;

        Ok(Self {
            index,
            embedding,
            similar_default_k,
            reembed_on_update: env_flag("HOTELS_REEMBED_ON_UPDATE", true)?,
            duplicate_name_threshold,
            fixture_path: PathBuf::from(env_or_default(
                "HOTELS_FIXTURE_PATH",
                DEFAULT_FIXTURE_PATH,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 12] = [
        "HOTELS_INDEX_NAME",
        "HOTELS_KEY_PREFIX",
        "HOTELS_VECTOR_DIMENSION",
        "HOTELS_DISTANCE_METRIC",
        "HOTELS_SIMILAR_DEFAULT_K",
        "HOTELS_REEMBED_ON_UPDATE",
        "HOTELS_DUPLICATE_NAME_THRESHOLD",
        "HOTELS_FIXTURE_PATH",
        "EMBEDDING_PROVIDER",
        "EMBEDDING_MODEL",
        "EMBEDDING_BASE_URL",
        "EMBEDDING_API_KEY",
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.iter().map(|key| (*key, None)).collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        temp_env::with_vars(unset_all(), || {
            let config = HotelsConfig::from_env().unwrap();
            assert_eq!(config, HotelsConfig::default());
            assert_eq!(config.index.index_name, "hotel_idx");
            assert_eq!(config.index.key_prefix, "hotel:");
            assert_eq!(config.index.dimension, 384);
            assert_eq!(config.similar_default_k, 3);
            assert!(config.reembed_on_update);
            assert_eq!(config.embedding.provider, EmbeddingProviderKind::FastEmbed);
            assert_eq!(config.embedding.model, "all-MiniLM-L6-v2");
            assert_eq!(config.duplicate_name_threshold, 0.8);
            assert!(config.embedding.api_key.is_none());
        });
    }

    #[test]
    fn test_overrides() {
        let mut vars = unset_all();
        vars.extend([
            ("HOTELS_INDEX_NAME", Some("idx_test")),
            ("HOTELS_VECTOR_DIMENSION", Some("8")),
            ("HOTELS_SIMILAR_DEFAULT_K", Some("5")),
            ("HOTELS_REEMBED_ON_UPDATE", Some("false")),
            ("EMBEDDING_PROVIDER", Some("hash")),
            ("EMBEDDING_BASE_URL", Some("http://localhost:11434/v1/")),
            ("EMBEDDING_API_KEY", Some("sk-test")),
        ]);

        temp_env::with_vars(vars, || {
            let config = HotelsConfig::from_env().unwrap();
            assert_eq!(config.index.index_name, "idx_test");
            assert_eq!(config.index.dimension, 8);
            assert_eq!(config.similar_default_k, 5);
            assert!(!config.reembed_on_update);
            assert_eq!(config.embedding.provider, EmbeddingProviderKind::Hash);
            assert_eq!(config.embedding.base_url, "http://localhost:11434/v1");
            assert_eq!(config.embedding.api_key.as_deref(), Some("sk-test"));
        });
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut vars = unset_all();
        vars.push(("HOTELS_VECTOR_DIMENSION", Some("0")));

        temp_env::with_vars(vars, || {
            let err = HotelsConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("HOTELS_VECTOR_DIMENSION"));
        });
    }

    #[test]
    fn test_k_out_of_range_rejected() {
        let mut vars = unset_all();
        vars.push(("HOTELS_SIMILAR_DEFAULT_K", Some("51")));

        temp_env::with_vars(vars, || {
            assert!(HotelsConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut vars = unset_all();
        vars.push(("EMBEDDING_PROVIDER", Some("word2vec")));

        temp_env::with_vars(vars, || {
            let err = EmbeddingConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("EMBEDDING_PROVIDER"));
        });
    }

    #[test]
    fn test_provider_kind_names() {
        assert_eq!(
            "fastembed".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::FastEmbed
        );
        assert_eq!(
            "OpenAI".parse::<EmbeddingProviderKind>().unwrap(),
            EmbeddingProviderKind::OpenAI
        );
        assert_eq!(EmbeddingProviderKind::Hash.to_string(), "hash");
    }

    #[test]
    fn test_default_model_matches_default_dimension() {
        let config = HotelsConfig::default();
        assert_eq!(
            local_model_dimension(&config.embedding.model),
            Some(config.index.dimension)
        );
        assert!(config.embedding.check_dimension(config.index.dimension).is_ok());
    }

    #[test]
    fn test_provider_picks_its_own_default_model() {
        let mut vars = unset_all();
        vars.push(("EMBEDDING_PROVIDER", Some("openai")));

        temp_env::with_vars(vars, || {
            let config = HotelsConfig::from_env().unwrap();
            assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAI);
            assert_eq!(config.embedding.model, "text-embedding-3-small");
            assert_eq!(config.embedding.base_url, "https://api.openai.com/v1");
        });
    }

    #[test]
    fn test_local_model_dimension_mismatch_rejected() {
        let mut vars = unset_all();
        vars.push(("HOTELS_VECTOR_DIMENSION", Some("768")));

        temp_env::with_vars(vars, || {
            let err = HotelsConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("HOTELS_VECTOR_DIMENSION"));
        });

        let mut vars = unset_all();
        vars.extend([
            ("EMBEDDING_MODEL", Some("all-mpnet-base-v2")),
            ("HOTELS_VECTOR_DIMENSION", Some("768")),
        ]);
        temp_env::with_vars(vars, || {
            assert!(HotelsConfig::from_env().is_ok());
        });
    }

    #[test]
    fn test_unknown_local_model_rejected() {
        let config = EmbeddingConfig {
            model: "text-embedding-3-small".to_string(),
            ..EmbeddingConfig::for_provider(EmbeddingProviderKind::FastEmbed)
        };
        let err = config.check_dimension(384).unwrap_err();
        assert!(err.to_string().contains("EMBEDDING_MODEL"));

        let remote = EmbeddingConfig::for_provider(EmbeddingProviderKind::OpenAI);
        assert!(remote.check_dimension(1536).is_ok());
    }

    #[test]
    fn test_duplicate_threshold_bounds() {
        let mut vars = unset_all();
        vars.push(("HOTELS_DUPLICATE_NAME_THRESHOLD", Some("0.5")));
        temp_env::with_vars(vars, || {
            assert_eq!(HotelsConfig::from_env().unwrap().duplicate_name_threshold, 0.5);
        });

        let mut vars = unset_all();
        vars.push(("HOTELS_DUPLICATE_NAME_THRESHOLD", Some("1.5")));
        temp_env::with_vars(vars, || {
            let err = HotelsConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("HOTELS_DUPLICATE_NAME_THRESHOLD"));
        });
    }
}
