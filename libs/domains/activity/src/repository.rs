use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::ActivityResult;
use crate::models::{ActivityLog, NewActivity};

/// Repository trait for activity log persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Insert a telemetry row
    async fn insert(&self, activity: NewActivity) -> ActivityResult<ActivityLog>;

    /// Newest rows first
    async fn recent(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>>;
}

/// In-memory implementation for tests and local development
#[derive(Clone, Default)]
pub struct InMemoryActivityRepository {
    logs: Arc<RwLock<Vec<ActivityLog>>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn insert(&self, activity: NewActivity) -> ActivityResult<ActivityLog> {
        let log = activity.into_log();
        self.logs.write().await.push(log.clone());

        tracing::info!(event_type = %log.event_type, context = %log.context, "Recorded activity");
        Ok(log)
    }

    async fn recent(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>> {
        let logs = self.logs.read().await;
        // Insertion order is chronological; ids are v7 so ties still sort.
        let mut newest: Vec<ActivityLog> = logs.iter().rev().cloned().collect();
        newest.truncate(limit as usize);
        Ok(newest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityContext, EventType};
    use serde_json::json;

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let repo = InMemoryActivityRepository::new();
        for i in 0..3 {
            repo.insert(
                NewActivity::new(EventType::AiEmbeddingStart, ActivityContext::GeminiPipeline)
                    .with_metadata(json!({ "n": i })),
            )
            .await
            .unwrap();
        }

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].metadata, json!({ "n": 2 }));
        assert_eq!(recent[1].metadata, json!({ "n": 1 }));
    }
}
