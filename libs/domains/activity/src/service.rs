use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ActivityError, ActivityResult};
use crate::models::{ActivityContext, ActivityLog, EventType, NewActivity, StudyDownload};
use crate::repository::ActivityRepository;

/// Telemetry as seen by the other domains.
///
/// `track` is fire-and-forget: a failed insert is logged at warn and never
/// reaches the caller.
#[async_trait]
pub trait ActivityTracker: Send + Sync {
    async fn track(&self, activity: NewActivity);

    async fn recent(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>>;
}

/// Service layer for activity logging
#[derive(Clone)]
pub struct ActivityService<R: ActivityRepository> {
    repository: Arc<R>,
}

impl<R: ActivityRepository> ActivityService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Insert a row, surfacing failures.
    pub async fn record(&self, activity: NewActivity) -> ActivityResult<ActivityLog> {
        self.repository.insert(activity).await
    }

    pub async fn recent_activity(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>> {
        self.repository.recent(limit).await
    }

    /// Record that a signed-in user downloaded a study asset.
    pub async fn log_study_download(
        &self,
        user_id: Uuid,
        input: StudyDownload,
    ) -> ActivityResult<ActivityLog> {
        input
            .validate()
            .map_err(|e| ActivityError::Validation(e.to_string()))?;

        self.record(
            NewActivity::new(EventType::StudyAssetDownload, ActivityContext::TranscriptReader)
                .with_user(Some(user_id))
                .with_metadata(json!({
                    "video_id": input.video_id,
                    "asset_type": input.asset_type,
                })),
        )
        .await
    }
}

#[async_trait]
impl<R: ActivityRepository> ActivityTracker for ActivityService<R> {
    async fn track(&self, activity: NewActivity) {
        let event_type = activity.event_type.clone();
        if let Err(e) = self.repository.insert(activity).await {
            tracing::warn!(%event_type, error = %e, "Failed to record activity");
        }
    }

    async fn recent(&self, limit: u64) -> ActivityResult<Vec<ActivityLog>> {
        self.recent_activity(limit).await
    }
}
