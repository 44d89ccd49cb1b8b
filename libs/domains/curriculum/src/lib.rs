//! Curriculum Domain
//!
//! Sections, chapters and videos, the learner's logbook, watch progress and
//! the playback gate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /logbook, /videos/{id}/..., /stats
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Access gate, signed URLs, completion rules
//! └──┬───────┬──┘
//!    │       │
//!    │  ┌────▼────────┐
//!    │  │ UrlSigner / │  ← media, activity
//!    │  │ Tracker     │
//!    │  └─────────────┘
//! ┌──▼──────────┐
//! │ Repository  │  ← Postgres (`check_resource_access` RPC) or in-memory
//! └─────────────┘
//! ```
//!
//! Playback goes through three checks in order: a signed-in caller, the
//! database's hierarchical entitlement procedure, and a stored asset id.
//! Only then is a one-hour signed link issued.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_activity::{ActivityService, InMemoryActivityRepository};
//! use domain_curriculum::{handlers, CurriculumService, InMemoryCurriculumRepository};
//! use media::{CloudinaryConfig, CloudinarySigner};
//!
//! let activity = Arc::new(ActivityService::new(InMemoryActivityRepository::new()));
//! let signer = Arc::new(CloudinarySigner::new(CloudinaryConfig::new("demo", "key", "secret")));
//! let service = Arc::new(CurriculumService::new(
//!     InMemoryCurriculumRepository::new(),
//!     signer,
//!     activity,
//! ));
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{CurriculumError, CurriculumResult};
pub use models::{
    AdminStats, Chapter, ContentCounts, Logbook, PlaybackResponse, Profile, ProgressUpdate,
    SavedProgress, Section, Transcript, Video, VideoSummary, WatchProgress,
};
pub use postgres::PgCurriculumRepository;
pub use repository::{CurriculumRepository, InMemoryCurriculumRepository};
pub use service::CurriculumService;
