use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AdventureResult;
use crate::models::{EmbeddingSource, PathVideo, Recommendation};

/// Repository trait for embeddings and path selection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdventureRepository: Send + Sync {
    async fn find_source(&self, video_id: Uuid) -> AdventureResult<Option<EmbeddingSource>>;

    /// Returns false when no video matched
    async fn store_embedding(&self, video_id: Uuid, embedding: &[f32]) -> AdventureResult<bool>;

    async fn find_embedding(&self, video_id: Uuid) -> AdventureResult<Option<Vec<f32>>>;

    /// Published videos that still need an embedding
    async fn pending_video_ids(&self) -> AdventureResult<Vec<Uuid>>;

    /// Nearest neighbours by cosine similarity, best first
    async fn match_videos(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: u32,
        exclude_id: Uuid,
    ) -> AdventureResult<Vec<Recommendation>>;

    /// Published videos other than `exclude_id`
    async fn count_published_except(&self, exclude_id: Uuid) -> AdventureResult<u64>;

    /// The `offset`-th published video other than `exclude_id`, in the same
    /// filter as [`count_published_except`](Self::count_published_except)
    async fn published_at_offset(
        &self,
        exclude_id: Uuid,
        offset: u64,
    ) -> AdventureResult<Option<PathVideo>>;
}

/// Video as held by [`InMemoryAdventureRepository`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVideo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub transcript_text: Option<String>,
    pub is_published: bool,
    pub embedding: Option<Vec<f32>>,
}

impl StoredVideo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            transcript_text: None,
            is_published: true,
            embedding: None,
        }
    }
}

/// In-memory implementation for tests and local development.
///
/// `match_videos` is evaluated here with the same cosine similarity the
/// database function uses.
#[derive(Clone, Default)]
pub struct InMemoryAdventureRepository {
    videos: Arc<RwLock<Vec<StoredVideo>>>,
}

impl InMemoryAdventureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_video(&self, video: StoredVideo) {
        self.videos.write().await.push(video);
    }
}

/// Cosine similarity; zero when either vector is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[async_trait]
impl AdventureRepository for InMemoryAdventureRepository {
    async fn find_source(&self, video_id: Uuid) -> AdventureResult<Option<EmbeddingSource>> {
        let videos = self.videos.read().await;
        Ok(videos
            .iter()
            .find(|v| v.id == video_id)
            .map(|v| EmbeddingSource {
                id: v.id,
                title: v.title.clone(),
                transcript_text: v.transcript_text.clone(),
            }))
    }

    async fn store_embedding(&self, video_id: Uuid, embedding: &[f32]) -> AdventureResult<bool> {
        let mut videos = self.videos.write().await;
        match videos.iter_mut().find(|v| v.id == video_id) {
            Some(video) => {
                video.embedding = Some(embedding.to_vec());
                tracing::info!(%video_id, dimension = embedding.len(), "Stored embedding");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_embedding(&self, video_id: Uuid) -> AdventureResult<Option<Vec<f32>>> {
        let videos = self.videos.read().await;
        Ok(videos
            .iter()
            .find(|v| v.id == video_id)
            .and_then(|v| v.embedding.clone()))
    }

    async fn pending_video_ids(&self) -> AdventureResult<Vec<Uuid>> {
        let videos = self.videos.read().await;
        Ok(videos
            .iter()
            .filter(|v| v.is_published && v.embedding.is_none())
            .map(|v| v.id)
            .collect())
    }

    async fn match_videos(
        &self,
        embedding: &[f32],
        threshold: f64,
        count: u32,
        exclude_id: Uuid,
    ) -> AdventureResult<Vec<Recommendation>> {
        let videos = self.videos.read().await;
        let mut matches: Vec<Recommendation> = videos
            .iter()
            .filter(|v| v.id != exclude_id && v.is_published)
            .filter_map(|v| {
                let similarity = cosine_similarity(embedding, v.embedding.as_deref()?);
                (similarity > threshold).then(|| Recommendation {
                    id: v.id,
                    title: v.title.clone(),
                    description: v.description.clone(),
                    similarity,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(count as usize);
        Ok(matches)
    }

    async fn count_published_except(&self, exclude_id: Uuid) -> AdventureResult<u64> {
        let videos = self.videos.read().await;
        Ok(videos
            .iter()
            .filter(|v| v.is_published && v.id != exclude_id)
            .count() as u64)
    }

    async fn published_at_offset(
        &self,
        exclude_id: Uuid,
        offset: u64,
    ) -> AdventureResult<Option<PathVideo>> {
        let videos = self.videos.read().await;
        Ok(videos
            .iter()
            .filter(|v| v.is_published && v.id != exclude_id)
            .nth(offset as usize)
            .map(|v| PathVideo {
                id: v.id,
                title: v.title.clone(),
                description: v.description.clone(),
            }))
    }
}
