use async_trait::async_trait;

use crate::error::{HotelError, HotelResult};

/// Trait for embedding generation providers
///
/// Every vector a provider returns has exactly [`dimension`](EmbeddingProvider::dimension)
/// components; a backend that answers with anything else is reported as
/// `HotelError::Embedding`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name used in logs and metric labels
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> HotelResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HotelError::Embedding("No embedding returned".to_string()))
    }

    /// Generate embeddings for multiple texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> HotelResult<Vec<Vec<f32>>>;
}

/// Reject a batch whose shape does not match the request.
pub(crate) fn check_batch(
    provider: &str,
    expected_len: usize,
    dimension: usize,
    vectors: &[Vec<f32>],
) -> HotelResult<()> {
    if vectors.len() != expected_len {
        return Err(HotelError::Embedding(format!(
            "{} returned {} embeddings for {} inputs",
            provider,
            vectors.len(),
            expected_len
        )));
    }

    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(HotelError::Embedding(format!(
            "{} returned a {}-dimensional embedding, expected {}",
            provider,
            bad.len(),
            dimension
        )));
    }

    Ok(())
}
