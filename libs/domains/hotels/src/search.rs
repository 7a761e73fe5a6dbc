use async_trait::async_trait;

use crate::error::HotelResult;
use crate::models::Neighbor;

/// Nearest-neighbor lookup over stored hotel embeddings.
///
/// Implementations return at most `k` neighbors ordered by ascending distance
/// (most similar first). A query vector whose length differs from
/// [`dimension`](SimilaritySearch::dimension) is a `Validation` error; an
/// unreachable or missing index is a `Query` error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    /// Create the index if it does not exist yet. Idempotent.
    async fn ensure_index(&self) -> HotelResult<()>;

    async fn knn(&self, vector: &[f32], k: usize) -> HotelResult<Vec<Neighbor>>;

    fn dimension(&self) -> usize;
}
