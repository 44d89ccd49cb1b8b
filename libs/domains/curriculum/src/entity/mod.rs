//! Sea-ORM entities for the curriculum tables.
//!
//! `videos.embedding` is a pgvector column and is left out of the entity;
//! the adventure domain reads and writes it with raw statements.

pub mod chapters;
pub mod profiles;
pub mod sections;
pub mod videos;
pub mod watch_history;
