//! Activity Domain
//!
//! Telemetry rows in `activity_logs`: embedding pipeline progress,
//! recommendation bridges, study downloads and completed videos.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← POST /study-downloads
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← ActivityTracker for the other domains
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← In-memory or Postgres
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← EventType, ActivityContext, ActivityLog
//! └─────────────┘
//! ```
//!
//! Telemetry never fails the operation that produced it: other domains go
//! through [`ActivityTracker::track`], which logs and swallows errors.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_activity::{handlers, ActivityService, InMemoryActivityRepository};
//!
//! let service = ActivityService::new(InMemoryActivityRepository::new());
//! let router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{ActivityError, ActivityResult};
pub use models::{ActivityContext, ActivityLog, EventType, NewActivity, StudyDownload};
pub use postgres::PgActivityRepository;
pub use repository::{ActivityRepository, InMemoryActivityRepository};
pub use service::{ActivityService, ActivityTracker};
