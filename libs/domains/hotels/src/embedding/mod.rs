#[cfg(feature = "fastembed")]
mod fastembed;
mod hash;
mod openai;
mod provider;

#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedProvider;
pub use hash::HashEmbeddingProvider;
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, EmbeddingProviderKind};
use crate::error::{HotelError, HotelResult};

/// Build the provider selected by `config`, producing `dimension`-sized vectors.
pub async fn build_provider(
    config: &EmbeddingConfig,
    dimension: usize,
) -> HotelResult<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::OpenAI => {
            let mut openai = OpenAIConfig::new(config.model.clone(), dimension)
                .with_base_url(config.base_url.clone());
            if let Some(api_key) = &config.api_key {
                openai = openai.with_api_key(api_key.clone());
            }
            Arc::new(OpenAIProvider::new(openai))
        }
        #[cfg(feature = "fastembed")]
        EmbeddingProviderKind::FastEmbed => {
            Arc::new(FastEmbedProvider::new(&config.model, dimension).await?)
        }
        #[cfg(not(feature = "fastembed"))]
        EmbeddingProviderKind::FastEmbed => {
            return Err(HotelError::Embedding(
                "EMBEDDING_PROVIDER=fastembed requires the `fastembed` feature".to_string(),
            ));
        }
        EmbeddingProviderKind::Hash => Arc::new(HashEmbeddingProvider::new(dimension)),
    };

    tracing::info!(
        provider = provider.name(),
        model = %config.model,
        dimension,
        "Embedding provider ready"
    );
    Ok(provider)
}
