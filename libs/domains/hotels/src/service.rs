use futures::future::try_join_all;
use observability::hotels::{HotelMetrics, SearchOutcome, SearchTimer};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::config::{DEFAULT_DUPLICATE_NAME_THRESHOLD, DEFAULT_SIMILAR_K, HotelsConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::{HotelError, HotelResult};
use crate::models::{CreateHotel, Hotel, HotelId, SimilarOptions, UpdateHotel, name_similarity};
use crate::repository::HotelRepository;
use crate::search::SimilaritySearch;

/// Fixture batches are embedded this many at a time
const EMBED_BATCH_SIZE: usize = 32;

/// Tunables of [`HotelService`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceSettings {
    pub default_k: usize,
    /// Recompute the embedding when an update touches its input text
    pub reembed_on_update: bool,
    /// [`name_similarity`] at or above which a neighbor is flagged as a
    /// possible duplicate
    pub duplicate_name_threshold: f32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            default_k: DEFAULT_SIMILAR_K,
            reembed_on_update: true,
            duplicate_name_threshold: DEFAULT_DUPLICATE_NAME_THRESHOLD,
        }
    }
}

impl From<&HotelsConfig> for ServiceSettings {
    fn from(config: &HotelsConfig) -> Self {
        Self {
            default_k: config.similar_default_k,
            reembed_on_update: config.reembed_on_update,
            duplicate_name_threshold: config.duplicate_name_threshold,
        }
    }
}

/// Service layer for Hotel business logic
pub struct HotelService<R: HotelRepository, S: SimilaritySearch> {
    repository: Arc<R>,
    search: Arc<S>,
    embedder: Arc<dyn EmbeddingProvider>,
    settings: ServiceSettings,
}

impl<R: HotelRepository, S: SimilaritySearch> Clone for HotelService<R, S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            search: Arc::clone(&self.search),
            embedder: Arc::clone(&self.embedder),
            settings: self.settings,
        }
    }
}

impl<R: HotelRepository, S: SimilaritySearch> HotelService<R, S> {
    pub fn new(
        repository: R,
        search: S,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(search), embedder, settings)
    }

    pub fn from_shared(
        repository: Arc<R>,
        search: Arc<S>,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            repository,
            search,
            embedder,
            settings,
        }
    }

    pub fn default_k(&self) -> usize {
        self.settings.default_k
    }

    pub fn search(&self) -> &S {
        &self.search
    }

    /// Embed one text and check it fits the index.
    async fn embed(&self, text: &str) -> HotelResult<Vec<f32>> {
        let embedding = self.embedder.embed(text).await?;
        self.check_dimension(&embedding)?;
        HotelMetrics::record_embeddings(self.embedder.name(), 1);
        Ok(embedding)
    }

    fn check_dimension(&self, embedding: &[f32]) -> HotelResult<()> {
        let expected = self.search.dimension();
        if embedding.len() != expected {
            return Err(HotelError::Embedding(format!(
                "{} produced a {}-dimensional embedding, index expects {}",
                self.embedder.name(),
                embedding.len(),
                expected
            )));
        }
        Ok(())
    }

    /// Validate, embed and persist a new hotel
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_hotel(&self, input: CreateHotel) -> HotelResult<Hotel> {
        input.validate()?;

        let embedding = self.embed(&input.embedding_text()).await?;
        let hotel = self.repository.create(input, embedding).await?;

        HotelMetrics::record_write("create");
        Ok(hotel)
    }

    /// Get a hotel by ID
    pub async fn get_hotel(&self, id: &HotelId) -> HotelResult<Hotel> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| HotelError::NotFound(id.clone()))
    }

    pub async fn list_hotels(&self) -> HotelResult<Vec<Hotel>> {
        self.repository.list_all().await
    }

    pub async fn count_hotels(&self) -> HotelResult<usize> {
        self.repository.count().await
    }

    pub async fn is_empty(&self) -> HotelResult<bool> {
        self.repository.is_empty().await
    }

    /// Apply a partial update. When the patch changes the embedding text and
    /// re-embedding is enabled, the stored vector is recomputed from the
    /// merged record.
    #[instrument(skip(self, id, input), fields(hotel_id = %id))]
    pub async fn update_hotel(&self, id: &HotelId, input: UpdateHotel) -> HotelResult<Hotel> {
        input.validate()?;

        let embedding = if self.settings.reembed_on_update && input.changes_embedding_text() {
            let mut merged = self.get_hotel(id).await?;
            merged.apply_update(input.clone(), None);
            Some(self.embed(&merged.embedding_text()).await?)
        } else {
            None
        };

        let hotel = self.repository.update(id, input, embedding).await?;
        HotelMetrics::record_write("update");
        Ok(hotel)
    }

    /// Delete a hotel
    #[instrument(skip(self, id), fields(hotel_id = %id))]
    pub async fn delete_hotel(&self, id: &HotelId) -> HotelResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(HotelError::NotFound(id.clone()));
        }

        HotelMetrics::record_write("delete");
        Ok(())
    }

    /// Up to `k` hotels nearest to `id`, most similar first. The hotel itself
    /// is part of the result when the index returns it.
    pub async fn find_similar(&self, id: &HotelId, k: usize) -> HotelResult<Vec<Hotel>> {
        self.find_similar_with(
            id,
            SimilarOptions {
                k,
                exclude_self: false,
            },
        )
        .await
    }

    #[instrument(skip(self, id, options), fields(hotel_id = %id, k = options.k))]
    pub async fn find_similar_with(
        &self,
        id: &HotelId,
        options: SimilarOptions,
    ) -> HotelResult<Vec<Hotel>> {
        let result = self.similar_hotels(id, options).await;

        let outcome = match &result {
            Ok((_, outcome)) => *outcome,
            Err(HotelError::NotFound(_)) => SearchOutcome::NotFound,
            Err(_) => SearchOutcome::Failed,
        };
        HotelMetrics::record_similar_search(outcome);

        result.map(|(hotels, _)| hotels)
    }

    async fn similar_hotels(
        &self,
        id: &HotelId,
        options: SimilarOptions,
    ) -> HotelResult<(Vec<Hotel>, SearchOutcome)> {
        let source = self.get_hotel(id).await?;

        let dimension = self.search.dimension();
        if !source.has_embedding_of(dimension) {
            tracing::warn!(
                hotel_id = %id,
                embedding_len = source.embedding.len(),
                expected = dimension,
                "Hotel has no usable embedding, returning no similar hotels"
            );
            return Ok((vec![], SearchOutcome::NoEmbedding));
        }

        let query_k = if options.exclude_self {
            options.k.saturating_add(1)
        } else {
            options.k
        };

        let mut timer = SearchTimer::start();
        let neighbors = self.search.knn(&source.embedding, query_k).await?;
        let elapsed_ms = timer.stop();
        tracing::debug!(
            hotel_id = %id,
            k = query_k,
            candidates = neighbors.len(),
            elapsed_ms,
            "Similarity query finished"
        );

        let candidates: Vec<HotelId> = neighbors
            .into_iter()
            .map(|n| n.id)
            .filter(|candidate| !(options.exclude_self && candidate == id))
            .collect();

        let hydrated = try_join_all(
            candidates
                .iter()
                .map(|candidate| self.repository.get_by_id(candidate)),
        )
        .await?;

        let mut hotels = Vec::with_capacity(hydrated.len());
        let mut skipped = 0;
        for (candidate, hotel) in candidates.iter().zip(hydrated) {
            match hotel {
                Some(hotel) => {
                    if hotel.id != source.id {
                        let score = name_similarity(&hotel.name, &source.name);
                        if score >= self.settings.duplicate_name_threshold {
                            tracing::info!(
                                hotel_id = %id,
                                similar_id = %hotel.id,
                                name = %hotel.name,
                                score,
                                "Similar hotel might be a duplicate based on the name"
                            );
                            HotelMetrics::record_possible_duplicate();
                        }
                    }
                    hotels.push(hotel);
                }
                None => {
                    tracing::warn!(
                        hotel_id = %id,
                        similar_id = %candidate,
                        "Similar hotel is indexed but missing from the store, skipping"
                    );
                    skipped += 1;
                }
            }
        }
        hotels.truncate(options.k);
        HotelMetrics::record_candidates_skipped(skipped);

        let outcome = if hotels.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Found
        };
        Ok((hotels, outcome))
    }

    /// Validate, embed (in batches) and persist `inputs`, in order.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn load_hotels(&self, inputs: Vec<CreateHotel>) -> HotelResult<Vec<Hotel>> {
        for (position, input) in inputs.iter().enumerate() {
            input.validate().map_err(|e| {
                HotelError::Validation(format!("hotel #{} ({}): {}", position, input.name, e))
            })?;
        }

        let total = inputs.len();
        let mut loaded = Vec::with_capacity(total);
        let mut pending = inputs.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<CreateHotel> = pending.by_ref().take(EMBED_BATCH_SIZE).collect();
            let texts: Vec<String> = batch.iter().map(CreateHotel::embedding_text).collect();

            let embeddings = self.embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(HotelError::Embedding(format!(
                    "{} returned {} embeddings for {} hotels",
                    self.embedder.name(),
                    embeddings.len(),
                    batch.len()
                )));
            }
            HotelMetrics::record_embeddings(self.embedder.name(), embeddings.len());

            for (input, embedding) in batch.into_iter().zip(embeddings) {
                self.check_dimension(&embedding)?;
                let hotel = self.repository.create(input, embedding).await?;
                HotelMetrics::record_write("load");
                tracing::info!(
                    hotel_id = %hotel.id,
                    name = %hotel.name,
                    progress = %format!("{}/{}", loaded.len() + 1, total),
                    "Loaded hotel"
                );
                loaded.push(hotel);
            }
        }

        HotelMetrics::set_hotels_loaded(loaded.len());
        Ok(loaded)
    }
}
