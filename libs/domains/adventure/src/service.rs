use domain_activity::{ActivityContext, ActivityTracker, EventType, NewActivity};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::embedding::{EmbeddingProvider, prepare_embedding_input};
use crate::error::{AdventureError, AdventureResult};
use crate::models::{
    ActionResponse, Crossroads, DEFAULT_RECOMMENDATION_LIMIT, EMBEDDING_DIMENSION,
    MATCH_THRESHOLD, PathVideo, RecommendationsResponse,
};
use crate::repository::AdventureRepository;

/// Embedding pipeline and next-video selection
#[derive(Clone)]
pub struct AdventureService<R: AdventureRepository> {
    repository: Arc<R>,
    embedder: Arc<dyn EmbeddingProvider>,
    activity: Arc<dyn ActivityTracker>,
    bulk_delay: Duration,
}

impl<R: AdventureRepository> AdventureService<R> {
    pub fn new(
        repository: R,
        embedder: Arc<dyn EmbeddingProvider>,
        activity: Arc<dyn ActivityTracker>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            embedder,
            activity,
            bulk_delay: Duration::from_millis(1000),
        }
    }

    /// Pause between items in [`bulk_process_embeddings`](Self::bulk_process_embeddings).
    pub fn with_bulk_delay(mut self, bulk_delay: Duration) -> Self {
        self.bulk_delay = bulk_delay;
        self
    }

    /// Embed one video's transcript and store the vector.
    pub async fn process_video_embedding(&self, video_id: Uuid) -> ActionResponse {
        let source = match self.repository.find_source(video_id).await {
            Ok(Some(source)) => source,
            Ok(None) => return ActionResponse::failed("Video or transcript not found."),
            Err(e) => {
                tracing::warn!(%video_id, error = %e, "Failed to load video for embedding");
                return ActionResponse::failed("Video or transcript not found.");
            }
        };

        let Some(transcript) = source
            .transcript_text
            .as_deref()
            .filter(|t| !t.is_empty())
        else {
            return ActionResponse::failed("Video has no transcript to process.");
        };

        self.track(EventType::AiEmbeddingStart, None, json!({
            "video_id": video_id,
            "video_title": source.title,
        }))
        .await;

        match self.embed_and_store(video_id, &source.title, transcript).await {
            Ok(dimension) => {
                self.track(EventType::AiEmbeddingSuccess, None, json!({
                    "video_id": video_id,
                    "dimension": dimension,
                }))
                .await;
                tracing::info!(%video_id, dimension, "Embedding stored");
                ActionResponse::ok(format!(
                    "Successfully generated embedding for: {}",
                    source.title
                ))
            }
            Err(e) => {
                tracing::error!(%video_id, error = %e, "Embedding pipeline failure");
                self.track(EventType::AiEmbeddingFailure, None, json!({
                    "video_id": video_id,
                    "error": e.to_string(),
                }))
                .await;
                ActionResponse::failed(format!("Failed to process embedding: {}", e))
            }
        }
    }

    async fn embed_and_store(
        &self,
        video_id: Uuid,
        title: &str,
        transcript: &str,
    ) -> AdventureResult<usize> {
        let embedding = self
            .embedder
            .embed(&prepare_embedding_input(title, transcript))
            .await?;

        if embedding.len() != EMBEDDING_DIMENSION {
            return Err(AdventureError::Embedding(format!(
                "expected {} dimensions, got {}",
                EMBEDDING_DIMENSION,
                embedding.len()
            )));
        }

        if !self.repository.store_embedding(video_id, &embedding).await? {
            return Err(AdventureError::VideoNotFound(video_id));
        }
        Ok(embedding.len())
    }

    /// Embed every published video that has none yet, one at a time.
    pub async fn bulk_process_embeddings(&self) -> ActionResponse {
        let pending = match self.repository.pending_video_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list videos pending embedding");
                return ActionResponse::failed(format!("Failed to process embedding: {}", e));
            }
        };

        if pending.is_empty() {
            return ActionResponse::ok("All videos indexed.");
        }

        let total = pending.len();
        let mut processed = 0usize;
        for (index, video_id) in pending.into_iter().enumerate() {
            if self.process_video_embedding(video_id).await.success {
                processed += 1;
            }
            if index + 1 < total && !self.bulk_delay.is_zero() {
                tokio::time::sleep(self.bulk_delay).await;
            }
        }

        tracing::info!(processed, total, "Bulk embedding run finished");
        ActionResponse::ok(format!("Successfully processed {} videos.", processed))
    }

    /// Nearest videos to `video_id` by transcript embedding.
    pub async fn semantic_recommendations(
        &self,
        user_id: Option<Uuid>,
        video_id: Uuid,
        limit: Option<u32>,
    ) -> RecommendationsResponse {
        let limit = limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT);

        let embedding = match self.repository.find_embedding(video_id).await {
            Ok(Some(embedding)) => embedding,
            Ok(None) => {
                return RecommendationsResponse::empty(Some(
                    "No embedding found for current video.".to_string(),
                ));
            }
            Err(e) => {
                tracing::warn!(%video_id, error = %e, "Failed to load source embedding");
                return RecommendationsResponse::empty(Some(
                    "No embedding found for current video.".to_string(),
                ));
            }
        };

        let matches = match self
            .repository
            .match_videos(&embedding, MATCH_THRESHOLD, limit, video_id)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(%video_id, error = %e, "Recommendation engine error");
                return RecommendationsResponse::empty(None);
            }
        };

        if user_id.is_some() {
            let ids: Vec<Uuid> = matches.iter().map(|m| m.id).collect();
            self.track(
                EventType::AiRecommendationGenerated,
                user_id,
                json!({
                    "source_video_id": video_id,
                    "recommendation_count": ids.len(),
                    "recommendation_ids": ids,
                }),
            )
            .await;
        }

        RecommendationsResponse::found(matches)
    }

    /// A uniformly random published video other than `exclude_id`.
    pub async fn random_path(&self, exclude_id: Uuid) -> Option<PathVideo> {
        match self.pick_random(exclude_id).await {
            Ok(video) => video,
            Err(e) => {
                tracing::error!(%exclude_id, error = %e, "Random path error");
                None
            }
        }
    }

    async fn pick_random(&self, exclude_id: Uuid) -> AdventureResult<Option<PathVideo>> {
        let total = self.repository.count_published_except(exclude_id).await?;
        if total == 0 {
            return Ok(None);
        }
        let offset = rand::random_range(0..total);
        self.repository.published_at_offset(exclude_id, offset).await
    }

    /// Semantic and random choices, looked up concurrently.
    pub async fn crossroads(&self, user_id: Option<Uuid>, video_id: Uuid) -> Crossroads {
        let (semantic, random) = futures::join!(
            self.semantic_recommendations(user_id, video_id, None),
            self.random_path(video_id),
        );
        Crossroads { semantic, random }
    }

    async fn track(
        &self,
        event_type: EventType,
        user_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) {
        let context = match event_type {
            EventType::AiRecommendationGenerated => ActivityContext::AdventureEngine,
            _ => ActivityContext::GeminiPipeline,
        };
        self.activity
            .track(
                NewActivity::new(event_type, context)
                    .with_user(user_id)
                    .with_metadata(metadata),
            )
            .await;
    }
}
