use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Largest `k` accepted by the similar-hotels endpoint
pub const MAX_SIMILAR_K: usize = 50;

/// Store-assigned hotel identifier (UUIDv7 in simple hex form, so ids sort by
/// creation time).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "0192f0c1b5a87d2e9c3f4a6b8d1e2f30")]
pub struct HotelId(String);

impl HotelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for HotelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for HotelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Contact details owned by a hotel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[validate(length(min = 1, max = 64))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 8))]
    pub country_calling_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    /// Free-form network name to handle/URL map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<BTreeMap<String, String>>,
}

/// Hotel record as persisted, including its embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub contact: Contact,
    /// Free text, e.g. "4 stars"
    pub rating: String,
    pub reviews_positive: String,
    pub reviews_negative: String,
    /// Empty when the record was stored without one
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Hotel {
    pub fn new(id: HotelId, input: CreateHotel, embedding: Vec<f32>) -> Self {
        Self {
            id,
            name: input.name,
            address: input.address,
            amenities: input.amenities,
            contact: input.contact,
            rating: input.rating,
            reviews_positive: input.reviews_positive,
            reviews_negative: input.reviews_negative,
            embedding,
        }
    }

    pub fn embedding_text(&self) -> String {
        embedding_text(
            &self.name,
            &self.address,
            &self.amenities,
            &self.rating,
            &self.reviews_positive,
            &self.reviews_negative,
        )
    }

    /// True when the embedding can be sent to an index of `dimension`.
    pub fn has_embedding_of(&self, dimension: usize) -> bool {
        !self.embedding.is_empty() && self.embedding.len() == dimension
    }

    /// Overwrite the supplied fields. A `Some` embedding replaces the vector;
    /// `None` leaves it as is, even if text fields changed.
    pub fn apply_update(&mut self, update: UpdateHotel, embedding: Option<Vec<f32>>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(amenities) = update.amenities {
            self.amenities = amenities;
        }
        if let Some(contact) = update.contact {
            self.contact = contact;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(reviews_positive) = update.reviews_positive {
            self.reviews_positive = reviews_positive;
        }
        if let Some(reviews_negative) = update.reviews_negative {
            self.reviews_negative = reviews_negative;
        }
        if let Some(embedding) = embedding {
            self.embedding = embedding;
        }
    }
}

/// Text fed to the embedding model:
/// `"{name} {address} {amenities...} {rating} {positive} {negative}"`.
pub fn embedding_text(
    name: &str,
    address: &str,
    amenities: &[String],
    rating: &str,
    reviews_positive: &str,
    reviews_negative: &str,
) -> String {
    format!(
        "{} {} {} {} {} {}",
        name,
        address,
        amenities.join(" "),
        rating,
        reviews_positive,
        reviews_negative
    )
}

/// Words too common in hotel names to tell two hotels apart
const GENERIC_NAME_TERMS: [&str; 4] = ["inn", "hotel", "lodge", "resort"];

/// Lowercased name keywords with the generic terms removed.
pub fn name_keywords(name: &str) -> BTreeSet<String> {
    name.split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !GENERIC_NAME_TERMS.contains(&word.as_str()))
        .collect()
}

/// Jaccard similarity of the two names' keywords, in `0.0..=1.0`.
/// Names with no keywords at all score 0.
pub fn name_similarity(a: &str, b: &str) -> f32 {
    let a = name_keywords(a);
    let b = name_keywords(b);

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f32 / union as f32
}

/// Input for creating a hotel; the embedding is computed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateHotel {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[validate(nested)]
    pub contact: Contact,
    #[validate(length(min = 1, max = 50))]
    pub rating: String,
    #[serde(default)]
    pub reviews_positive: String,
    #[serde(default)]
    pub reviews_negative: String,
}

impl CreateHotel {
    pub fn embedding_text(&self) -> String {
        embedding_text(
            &self.name,
            &self.address,
            &self.amenities,
            &self.rating,
            &self.reviews_positive,
            &self.reviews_negative,
        )
    }
}

/// Partial update; absent fields keep their stored value. Unknown keys
/// (including `embedding`) are rejected rather than ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateHotel {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    pub amenities: Option<Vec<String>>,
    #[validate(nested)]
    pub contact: Option<Contact>,
    #[validate(length(min = 1, max = 50))]
    pub rating: Option<String>,
    pub reviews_positive: Option<String>,
    pub reviews_negative: Option<String>,
}

impl UpdateHotel {
    /// Whether applying this patch changes the embedding input text.
    pub fn changes_embedding_text(&self) -> bool {
        self.name.is_some()
            || self.address.is_some()
            || self.amenities.is_some()
            || self.rating.is_some()
            || self.reviews_positive.is_some()
            || self.reviews_negative.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.changes_embedding_text() && self.contact.is_none()
    }
}

/// Hotel as returned by the API (no embedding vector)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HotelResponse {
    pub id: HotelId,
    pub name: String,
    pub address: String,
    pub amenities: Vec<String>,
    pub contact: Contact,
    pub rating: String,
    pub reviews_positive: String,
    pub reviews_negative: String,
}

impl From<Hotel> for HotelResponse {
    fn from(hotel: Hotel) -> Self {
        Self {
            id: hotel.id,
            name: hotel.name,
            address: hotel.address,
            amenities: hotel.amenities,
            contact: hotel.contact,
            rating: hotel.rating,
            reviews_positive: hotel.reviews_positive,
            reviews_negative: hotel.reviews_negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SimilarHotelsResponse {
    /// Nearest first
    pub similar_hotels: Vec<HotelResponse>,
}

/// Query string of `GET /{id}/similar`
#[derive(Debug, Clone, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SimilarQuery {
    /// Number of neighbors to return (defaults to the configured k, usually 3)
    #[validate(range(min = 1, max = 50))]
    pub k: Option<usize>,
    /// Drop the queried hotel from its own results
    #[serde(default)]
    pub exclude_self: bool,
}

/// Options for [`crate::service::HotelService::find_similar_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarOptions {
    pub k: usize,
    pub exclude_self: bool,
}

/// One KNN hit: a hotel id and its distance to the query vector (lower is closer).
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: HotelId,
    pub score: f32,
}

/// Distance metric of the vector index
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    L2,
    Ip,
}

impl DistanceMetric {
    /// Distance as the store reports it: `1 - cos` for cosine, squared
    /// euclidean for L2, `1 - dot` for inner product.
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::Cosine => {
                let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
                let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (norm_a * norm_b)
                }
            }
            DistanceMetric::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            DistanceMetric::Ip => 1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            phone: "+1 555 0100".into(),
            email: "front@seaside.example".into(),
            country_calling_code: Some("+1".into()),
            website: None,
            contact_person: None,
            social_media: None,
        }
    }

    fn create() -> CreateHotel {
        CreateHotel {
            name: "Seaside Inn".into(),
            address: "1 Ocean Drive".into(),
            amenities: vec!["pool".into(), "wifi".into()],
            contact: contact(),
            rating: "4 stars".into(),
            reviews_positive: "Great view".into(),
            reviews_negative: "Noisy".into(),
        }
    }

    #[test]
    fn test_embedding_text_concatenation() {
        assert_eq!(
            create().embedding_text(),
            "Seaside Inn 1 Ocean Drive pool wifi 4 stars Great view Noisy"
        );
    }

    #[test]
    fn test_hotel_and_create_share_embedding_text() {
        let input = create();
        let hotel = Hotel::new(HotelId::generate(), input.clone(), vec![]);
        assert_eq!(hotel.embedding_text(), input.embedding_text());
    }

    #[test]
    fn test_generated_ids_are_unique_and_ordered() {
        let a = HotelId::generate();
        let b = HotelId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a < b);
    }

    #[test]
    fn test_hotel_id_serializes_as_plain_string() {
        let id = HotelId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_create_validation() {
        assert!(create().validate().is_ok());

        let mut blank_name = create();
        blank_name.name = String::new();
        assert!(blank_name.validate().is_err());

        let mut bad_email = create();
        bad_email.contact.email = "not-an-email".into();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_apply_update_keeps_embedding_unless_given() {
        let mut hotel = Hotel::new(HotelId::generate(), create(), vec![1.0, 0.0]);

        hotel.apply_update(
            UpdateHotel {
                name: Some("Seaside Resort".into()),
                ..Default::default()
            },
            None,
        );
        assert_eq!(hotel.name, "Seaside Resort");
        assert_eq!(hotel.address, "1 Ocean Drive");
        assert_eq!(hotel.embedding, vec![1.0, 0.0]);

        hotel.apply_update(UpdateHotel::default(), Some(vec![0.0, 1.0]));
        assert_eq!(hotel.embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_update_changes_embedding_text() {
        assert!(!UpdateHotel::default().changes_embedding_text());
        assert!(UpdateHotel::default().is_empty());

        let contact_only = UpdateHotel {
            contact: Some(contact()),
            ..Default::default()
        };
        assert!(!contact_only.changes_embedding_text());
        assert!(!contact_only.is_empty());

        let rating = UpdateHotel {
            rating: Some("5 stars".into()),
            ..Default::default()
        };
        assert!(rating.changes_embedding_text());
    }

    #[test]
    fn test_has_embedding_of() {
        let mut hotel = Hotel::new(HotelId::generate(), create(), vec![]);
        assert!(!hotel.has_embedding_of(3));

        hotel.embedding = vec![0.1, 0.2];
        assert!(!hotel.has_embedding_of(3));

        hotel.embedding = vec![0.1, 0.2, 0.3];
        assert!(hotel.has_embedding_of(3));
    }

    #[test]
    fn test_response_omits_embedding() {
        let hotel = Hotel::new(HotelId::new("h1"), create(), vec![0.5; 4]);
        let json = serde_json::to_value(HotelResponse::from(hotel)).unwrap();
        assert!(json.get("embedding").is_none());
        assert_eq!(json["id"], "h1");
    }

    #[test]
    fn test_cosine_distance() {
        let metric = DistanceMetric::Cosine;
        assert!(metric.distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((metric.distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((metric.distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert_eq!(metric.distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn test_metric_parses_case_insensitively() {
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::L2);
        assert_eq!(DistanceMetric::Ip.to_string(), "IP");
    }

    #[test]
    fn test_name_similarity_ignores_generic_terms() {
        assert_eq!(name_similarity("Acme Hotel", "Acme Hotel Resort"), 1.0);
        assert_eq!(name_similarity("Acme Hotel", "ACME inn"), 1.0);
        assert_eq!(name_similarity("Acme Harbor Hotel", "Acme Hotel"), 0.5);
        assert_eq!(name_similarity("Acme Hotel", "Zenith Lodge"), 0.0);
        assert_eq!(name_similarity("Hotel", "Inn"), 0.0);
    }

    #[test]
    fn test_name_keywords() {
        let keywords = name_keywords("  Seaside  Beach Resort ");
        assert_eq!(
            keywords.into_iter().collect::<Vec<_>>(),
            vec!["beach".to_string(), "seaside".to_string()]
        );
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        assert!(serde_json::from_str::<UpdateHotel>(r#"{"nmae": "Typo"}"#).is_err());
        assert!(serde_json::from_str::<UpdateHotel>(r#"{"embedding": [1.0]}"#).is_err());
        assert!(serde_json::from_str::<UpdateHotel>(r#"{"name": "Fine"}"#).is_ok());
        assert!(
            serde_json::from_str::<Contact>(r#"{"phone": "1", "email": "a@b.example", "fax": "2"}"#)
                .is_err()
        );
    }
}
