//! Fixture loading: seed an empty store from a JSON file of hotels.

use serde::Deserialize;
use std::path::Path;

use crate::error::{HotelError, HotelResult};
use crate::models::{Contact, CreateHotel};
use crate::repository::HotelRepository;
use crate::search::SimilaritySearch;
use crate::service::HotelService;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureReviews {
    #[serde(default)]
    pub positive: String,
    #[serde(default)]
    pub negative: String,
}

/// One entry of the fixture file; reviews are nested there.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureHotel {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub contact: Contact,
    pub rating: String,
    #[serde(default)]
    pub reviews: FixtureReviews,
}

impl From<FixtureHotel> for CreateHotel {
    fn from(fixture: FixtureHotel) -> Self {
        Self {
            name: fixture.name,
            address: fixture.address,
            amenities: fixture.amenities,
            contact: fixture.contact,
            rating: fixture.rating,
            reviews_positive: fixture.reviews.positive,
            reviews_negative: fixture.reviews.negative,
        }
    }
}

pub fn parse_fixtures(raw: &str) -> HotelResult<Vec<CreateHotel>> {
    let fixtures: Vec<FixtureHotel> = serde_json::from_str(raw)
        .map_err(|e| HotelError::Validation(format!("invalid fixture file: {}", e)))?;
    Ok(fixtures.into_iter().map(CreateHotel::from).collect())
}

pub async fn read_fixtures(path: &Path) -> HotelResult<Vec<CreateHotel>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        HotelError::Internal(format!("failed to read {}: {}", path.display(), e))
    })?;
    parse_fixtures(&raw)
}

/// Load every hotel in `path`, regardless of what the store already holds.
pub async fn load_fixtures<R, S>(service: &HotelService<R, S>, path: &Path) -> HotelResult<usize>
where
    R: HotelRepository,
    S: SimilaritySearch,
{
    let inputs = read_fixtures(path).await?;
    tracing::info!(path = %path.display(), count = inputs.len(), "Loading hotels");

    let loaded = service.load_hotels(inputs).await?;
    tracing::info!(count = loaded.len(), "Hotels loaded");
    Ok(loaded.len())
}

/// Seed from `path` only when the store is empty. Returns how many hotels
/// were loaded (zero when data already existed).
pub async fn ensure_data_loaded<R, S>(
    service: &HotelService<R, S>,
    path: &Path,
) -> HotelResult<usize>
where
    R: HotelRepository,
    S: SimilaritySearch,
{
    if !service.is_empty().await? {
        let existing = service.count_hotels().await?;
        tracing::info!(count = existing, "Hotel data already present, skipping seed");
        return Ok(0);
    }

    load_fixtures(service, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbeddingProvider;
    use crate::repository::InMemoryHotelRepository;
    use crate::service::ServiceSettings;
    use std::sync::Arc;

    const FIXTURE: &str = r#"[
        {
            "name": "Harbor View",
            "address": "12 Quay Street",
            "amenities": ["wifi", "breakfast"],
            "contact": {"phone": "+44 20 7946 0000", "email": "stay@harborview.example"},
            "rating": "4 stars",
            "reviews": {"positive": "Lovely view", "negative": "Tiny lift"}
        },
        {
            "name": "Old Mill Lodge",
            "address": "3 River Lane",
            "contact": {"phone": "+44 20 7946 0001", "email": "hello@oldmill.example",
                        "social_media": {"instagram": "@oldmill"}},
            "rating": "3 stars"
        }
    ]"#;

    fn service() -> (
        InMemoryHotelRepository,
        HotelService<InMemoryHotelRepository, InMemoryHotelRepository>,
    ) {
        let repo = InMemoryHotelRepository::new(32);
        let service = HotelService::new(
            repo.clone(),
            repo.clone(),
            Arc::new(HashEmbeddingProvider::new(32)),
            ServiceSettings::default(),
        );
        (repo, service)
    }

    fn fixture_file() -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "hotels-fixture-{}.json",
            crate::models::HotelId::generate()
        ));
        std::fs::write(&path, FIXTURE).unwrap();
        path
    }

    #[test]
    fn test_parse_flattens_reviews() {
        let hotels = parse_fixtures(FIXTURE).unwrap();
        assert_eq!(hotels.len(), 2);
        assert_eq!(hotels[0].reviews_positive, "Lovely view");
        assert_eq!(hotels[0].reviews_negative, "Tiny lift");
        assert!(hotels[1].amenities.is_empty());
        assert_eq!(hotels[1].reviews_positive, "");
        assert_eq!(
            hotels[1].contact.social_media.as_ref().unwrap()["instagram"],
            "@oldmill"
        );
    }

    #[test]
    fn test_bundled_fixture_is_valid() {
        use validator::Validate;

        let raw = include_str!("../../../../data/hotels.json");
        let hotels = parse_fixtures(raw).unwrap();
        assert!(!hotels.is_empty());
        for hotel in &hotels {
            hotel.validate().unwrap();
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_fixtures("{\"name\": 1}"),
            Err(HotelError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = read_fixtures(Path::new("/nonexistent/hotels.json")).await;
        assert!(matches!(result, Err(HotelError::Internal(_))));
    }

    #[tokio::test]
    async fn test_ensure_data_loaded_seeds_once() {
        let (repo, service) = service();
        let path = fixture_file();

        assert_eq!(ensure_data_loaded(&service, &path).await.unwrap(), 2);
        assert_eq!(ensure_data_loaded(&service, &path).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_load_fixtures_ignores_existing_data() {
        let (repo, service) = service();
        let path = fixture_file();

        load_fixtures(&service, &path).await.unwrap();
        load_fixtures(&service, &path).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 4);

        let _ = std::fs::remove_file(path);
    }
}
