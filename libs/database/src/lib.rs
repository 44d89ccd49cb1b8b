//! Postgres connectivity for the academy services.
//!
//! The schema (tables, `pgvector` columns, `match_videos` and
//! `check_resource_access`) lives in the hosted database; this crate only
//! opens the pool, retries at startup and answers readiness probes.
//!
//! ```ignore
//! use database::{RetryConfig, postgres::{PostgresConfig, connect_from_config_with_retry}};
//! use core_config::FromEnv;
//!
//! let db = connect_from_config_with_retry(PostgresConfig::from_env()?, &RetryConfig::from_env()?).await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
