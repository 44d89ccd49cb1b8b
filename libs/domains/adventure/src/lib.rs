//! Adventure Domain
//!
//! Turns transcripts into embeddings and picks the next video, either by
//! meaning or at random.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /videos/{id}/recommendations, /random, /crossroads
//! └──────┬──────┘    admin: /videos/{id}/embedding, /embeddings/bulk
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Pipeline telemetry, thresholds, random pick
//! └──┬───────┬──┘
//!    │       │
//!    │  ┌────▼──────────────┐
//!    │  │ EmbeddingProvider │  ← Gemini `embedContent`
//!    │  └───────────────────┘
//! ┌──▼──────────┐
//! │ Repository  │  ← Postgres (pgvector, `match_videos` RPC) or in-memory
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_activity::{ActivityService, InMemoryActivityRepository};
//! use domain_adventure::{AdventureService, GeminiConfig, GeminiProvider, InMemoryAdventureRepository};
//!
//! let activity = Arc::new(ActivityService::new(InMemoryActivityRepository::new()));
//! let embedder = Arc::new(GeminiProvider::new(GeminiConfig::new("api-key")));
//! let service = AdventureService::new(InMemoryAdventureRepository::new(), embedder, activity);
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use config::{GeminiConfig, PipelineConfig};
pub use embedding::{EmbeddingProvider, GeminiProvider};
pub use error::{AdventureError, AdventureResult};
pub use models::{
    ActionResponse, Crossroads, EMBEDDING_DIMENSION, PathVideo, Recommendation,
    RecommendationsResponse,
};
pub use postgres::PgAdventureRepository;
pub use repository::{AdventureRepository, InMemoryAdventureRepository, StoredVideo};
pub use service::AdventureService;
