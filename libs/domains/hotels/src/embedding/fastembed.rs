//! Local sentence embeddings via fastembed (ONNX runtime).

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};

use super::provider::{EmbeddingProvider, check_batch};
use crate::config::local_model_dimension;
use crate::error::{HotelError, HotelResult};

/// Map a model name to the fastembed model and its native dimension.
fn parse_model(model_name: &str) -> Option<(EmbeddingModel, usize)> {
    let model = match model_name.to_lowercase().as_str() {
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            EmbeddingModel::AllMiniLML6V2
        }
        "all-mpnet-base-v2" | "sentence-transformers/all-mpnet-base-v2" => {
            EmbeddingModel::AllMpnetBaseV2
        }
        "bge-small-en-v1.5" | "baai/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" | "baai/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        _ => return None,
    };
    Some((model, local_model_dimension(model_name)?))
}

/// The model is not `Sync`-friendly for concurrent inference, so calls are
/// serialized through a mutex and run on the blocking pool.
#[derive(Clone)]
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Load `model_name`, downloading it on first use. Fails when the model is
    /// unknown or its dimension differs from `dimension`.
    pub async fn new(model_name: &str, dimension: usize) -> HotelResult<Self> {
        let (model, native) = parse_model(model_name).ok_or_else(|| {
            HotelError::Embedding(format!("unsupported fastembed model '{}'", model_name))
        })?;

        if native != dimension {
            return Err(HotelError::Embedding(format!(
                "model '{}' produces {}-dimensional vectors, index expects {}",
                model_name, native, dimension
            )));
        }

        let text_embedding = tokio::task::spawn_blocking(move || {
            TextEmbedding::try_new(InitOptions::new(model))
        })
        .await
        .map_err(|e| HotelError::Internal(format!("model loader panicked: {}", e)))?
        .map_err(|e| {
            HotelError::Embedding(format!("Failed to initialize FastEmbed model: {}", e))
        })?;

        tracing::info!(model = %model_name, dimension, "Loaded local embedding model");

        Ok(Self {
            model: Arc::new(Mutex::new(text_embedding)),
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> HotelResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = Arc::clone(&self.model);
        let input = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| HotelError::Internal("embedding model lock poisoned".to_string()))?;
            model
                .embed(input, None)
                .map_err(|e| HotelError::Embedding(format!("FastEmbed embedding failed: {}", e)))
        })
        .await
        .map_err(|e| HotelError::Internal(format!("embedding task panicked: {}", e)))??;

        check_batch(self.name(), texts.len(), self.dimension, &vectors)?;
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_names() {
        assert!(matches!(
            parse_model("all-MiniLM-L6-v2"),
            Some((EmbeddingModel::AllMiniLML6V2, 384))
        ));
        assert!(matches!(
            parse_model("BAAI/bge-base-en-v1.5"),
            Some((EmbeddingModel::BGEBaseENV15, 768))
        ));
        assert!(parse_model("word2vec").is_none());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected_before_download() {
        let result = FastEmbedProvider::new("all-MiniLM-L6-v2", 768).await;
        assert!(matches!(result, Err(HotelError::Embedding(_))));
    }
}
