//! Hotels Domain
//!
//! Hotel catalogue with "find similar hotels" backed by nearest-neighbor
//! search over text embeddings.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/hotels, /hotels/{id}/similar)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌────────────────────┐
//! │   Service   │─────►│ EmbeddingProvider  │  ← OpenAI-compatible / fastembed / hash
//! └──┬───────┬──┘      └────────────────────┘
//!    │       │
//! ┌──▼───┐ ┌─▼────────────────┐
//! │ Repo │ │ SimilaritySearch │  ← Redis (RedisJSON + RediSearch) or in-memory
//! └──┬───┘ └─┬────────────────┘
//!    │       │
//! ┌──▼───────▼──┐
//! │   Models    │  ← Hotel, Contact, DTOs, Neighbor
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_hotels::{
//!     handlers,
//!     embedding::HashEmbeddingProvider,
//!     repository::InMemoryHotelRepository,
//!     service::{HotelService, ServiceSettings},
//! };
//!
//! let repository = InMemoryHotelRepository::new(384);
//! let service = HotelService::new(
//!     repository.clone(),
//!     repository,
//!     Arc::new(HashEmbeddingProvider::new(384)),
//!     ServiceSettings::default(),
//! );
//!
//! let router = handlers::router(service);
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod redis;
pub mod repository;
pub mod search;
pub mod service;

// Re-export commonly used types
pub use config::{EmbeddingConfig, EmbeddingProviderKind, HotelsConfig, VectorIndexConfig};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider, OpenAIProvider, build_provider};
pub use error::{HotelError, HotelResult};
pub use models::{
    Contact, CreateHotel, DistanceMetric, Hotel, HotelId, HotelResponse, Neighbor,
    SimilarHotelsResponse, SimilarOptions, SimilarQuery, UpdateHotel, name_similarity,
};
pub use self::redis::{RedisHotelRepository, RedisVectorIndex};
pub use repository::{HotelRepository, InMemoryHotelRepository};
pub use search::SimilaritySearch;
pub use service::{HotelService, ServiceSettings};
