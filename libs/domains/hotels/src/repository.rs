use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{HotelError, HotelResult};
use crate::models::{CreateHotel, DistanceMetric, Hotel, HotelId, Neighbor, UpdateHotel};
use crate::search::SimilaritySearch;

/// Repository trait for Hotel persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HotelRepository: Send + Sync {
    /// Store a new hotel under a freshly generated id
    async fn create(&self, input: CreateHotel, embedding: Vec<f32>) -> HotelResult<Hotel>;

    /// Get a hotel by ID
    async fn get_by_id(&self, id: &HotelId) -> HotelResult<Option<Hotel>>;

    /// Apply a partial update; `embedding` replaces the stored vector when given
    async fn update(
        &self,
        id: &HotelId,
        input: UpdateHotel,
        embedding: Option<Vec<f32>>,
    ) -> HotelResult<Hotel>;

    /// Delete a hotel by ID, returning whether it existed
    async fn delete(&self, id: &HotelId) -> HotelResult<bool>;

    async fn list_all(&self) -> HotelResult<Vec<Hotel>>;

    async fn count(&self) -> HotelResult<usize>;

    async fn is_empty(&self) -> HotelResult<bool> {
        Ok(self.count().await? == 0)
    }
}

/// In-memory implementation of HotelRepository (for development/testing).
///
/// Also answers similarity queries by brute force, so a single instance can
/// stand in for the whole Redis stack.
#[derive(Debug, Clone)]
pub struct InMemoryHotelRepository {
    hotels: Arc<RwLock<HashMap<HotelId, Hotel>>>,
    dimension: usize,
    metric: DistanceMetric,
}

impl InMemoryHotelRepository {
    pub fn new(dimension: usize) -> Self {
        Self {
            hotels: Arc::new(RwLock::new(HashMap::new())),
            dimension,
            metric: DistanceMetric::Cosine,
        }
    }

    /// Rank neighbors by `metric` instead of cosine distance.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Insert a fully formed record, replacing any hotel with the same id.
    pub async fn insert(&self, hotel: Hotel) {
        self.hotels.write().await.insert(hotel.id.clone(), hotel);
    }
}

#[async_trait]
impl HotelRepository for InMemoryHotelRepository {
    async fn create(&self, input: CreateHotel, embedding: Vec<f32>) -> HotelResult<Hotel> {
        let hotel = Hotel::new(HotelId::generate(), input, embedding);
        self.hotels
            .write()
            .await
            .insert(hotel.id.clone(), hotel.clone());

        tracing::info!(hotel_id = %hotel.id, "Created hotel");
        Ok(hotel)
    }

    async fn get_by_id(&self, id: &HotelId) -> HotelResult<Option<Hotel>> {
        let hotels = self.hotels.read().await;
        Ok(hotels.get(id).cloned())
    }

    async fn update(
        &self,
        id: &HotelId,
        input: UpdateHotel,
        embedding: Option<Vec<f32>>,
    ) -> HotelResult<Hotel> {
        let mut hotels = self.hotels.write().await;
        let hotel = hotels
            .get_mut(id)
            .ok_or_else(|| HotelError::NotFound(id.clone()))?;

        hotel.apply_update(input, embedding);

        tracing::info!(hotel_id = %id, "Updated hotel");
        Ok(hotel.clone())
    }

    async fn delete(&self, id: &HotelId) -> HotelResult<bool> {
        let mut hotels = self.hotels.write().await;

        if hotels.remove(id).is_some() {
            tracing::info!(hotel_id = %id, "Deleted hotel");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list_all(&self) -> HotelResult<Vec<Hotel>> {
        let hotels = self.hotels.read().await;
        let mut result: Vec<Hotel> = hotels.values().cloned().collect();
        // Ids are time-ordered
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn count(&self) -> HotelResult<usize> {
        Ok(self.hotels.read().await.len())
    }
}

#[async_trait]
impl SimilaritySearch for InMemoryHotelRepository {
    async fn ensure_index(&self) -> HotelResult<()> {
        Ok(())
    }

    async fn knn(&self, vector: &[f32], k: usize) -> HotelResult<Vec<Neighbor>> {
        if vector.len() != self.dimension {
            return Err(HotelError::Validation(format!(
                "query vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        if k == 0 {
            return Ok(vec![]);
        }

        let hotels = self.hotels.read().await;
        let mut neighbors: Vec<Neighbor> = hotels
            .values()
            .filter(|h| h.has_embedding_of(self.dimension))
            .map(|h| Neighbor {
                id: h.id.clone(),
                score: self.metric.distance(vector, &h.embedding),
            })
            .collect();

        neighbors.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.id.cmp(&b.id)));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contact;

    fn input(name: &str) -> CreateHotel {
        CreateHotel {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            amenities: vec!["wifi".to_string()],
            contact: Contact {
                phone: "555-0100".to_string(),
                email: "desk@hotel.example".to_string(),
                country_calling_code: None,
                website: None,
                contact_person: None,
                social_media: None,
            },
            rating: "3 stars".to_string(),
            reviews_positive: "Clean".to_string(),
            reviews_negative: "Small rooms".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_hotel() {
        let repo = InMemoryHotelRepository::new(2);

        let hotel = repo.create(input("Alpha"), vec![1.0, 0.0]).await.unwrap();
        assert_eq!(hotel.name, "Alpha");
        assert_eq!(hotel.embedding, vec![1.0, 0.0]);

        let fetched = repo.get_by_id(&hotel.id).await.unwrap().unwrap();
        assert_eq!(fetched, hotel);
        assert!(repo.get_by_id(&HotelId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_hotel() {
        let repo = InMemoryHotelRepository::new(2);
        let result = repo
            .update(&HotelId::new("nope"), UpdateHotel::default(), None)
            .await;
        assert!(matches!(result, Err(HotelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_and_count() {
        let repo = InMemoryHotelRepository::new(2);
        assert!(repo.is_empty().await.unwrap());

        let hotel = repo.create(input("Alpha"), vec![1.0, 0.0]).await.unwrap();
        repo.create(input("Beta"), vec![0.0, 1.0]).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
        assert!(!repo.is_empty().await.unwrap());

        assert!(repo.delete(&hotel.id).await.unwrap());
        assert!(!repo.delete(&hotel.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_all_in_creation_order() {
        let repo = InMemoryHotelRepository::new(2);
        for name in ["Alpha", "Beta", "Gamma"] {
            repo.create(input(name), vec![1.0, 0.0]).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[tokio::test]
    async fn test_knn_orders_by_distance() {
        let repo = InMemoryHotelRepository::new(2);
        let near = repo.create(input("Near"), vec![1.0, 0.1]).await.unwrap();
        let far = repo.create(input("Far"), vec![-1.0, 0.0]).await.unwrap();
        let mid = repo.create(input("Mid"), vec![0.0, 1.0]).await.unwrap();

        let neighbors = repo.knn(&[1.0, 0.0], 3).await.unwrap();
        let ids: Vec<&HotelId> = neighbors.iter().map(|n| &n.id).collect();
        assert_eq!(ids, vec![&near.id, &mid.id, &far.id]);
        assert!(neighbors.windows(2).all(|w| w[0].score <= w[1].score));

        assert_eq!(repo.knn(&[1.0, 0.0], 1).await.unwrap().len(), 1);
        assert!(repo.knn(&[1.0, 0.0], 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_knn_uses_configured_metric() {
        let cosine = InMemoryHotelRepository::new(2);
        let l2 = InMemoryHotelRepository::new(2).with_metric(DistanceMetric::L2);
        for repo in [&cosine, &l2] {
            repo.insert(Hotel::new(HotelId::new("long"), input("Long"), vec![3.0, 0.0]))
                .await;
            repo.insert(Hotel::new(HotelId::new("close"), input("Close"), vec![0.9, 0.1]))
                .await;
        }

        let by_angle = cosine.knn(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(by_angle[0].id.as_str(), "long");

        let by_length = l2.knn(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(by_length[0].id.as_str(), "close");
    }

    #[tokio::test]
    async fn test_knn_skips_records_without_embedding() {
        let repo = InMemoryHotelRepository::new(2);
        repo.create(input("Bare"), vec![]).await.unwrap();
        repo.create(input("Short"), vec![1.0]).await.unwrap();
        let full = repo.create(input("Full"), vec![1.0, 0.0]).await.unwrap();

        let neighbors = repo.knn(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].id, full.id);
    }

    #[tokio::test]
    async fn test_knn_rejects_wrong_dimension() {
        let repo = InMemoryHotelRepository::new(2);
        let result = repo.knn(&[1.0, 0.0, 0.0], 3).await;
        assert!(matches!(result, Err(HotelError::Validation(_))));
    }
}
