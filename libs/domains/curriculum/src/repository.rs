use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CurriculumResult;
use crate::models::{Chapter, ContentCounts, Profile, SavedProgress, Section, Video, WatchProgress};

/// Repository trait for curriculum data access
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    /// All sections ordered by `order_index`
    async fn list_sections(&self) -> CurriculumResult<Vec<Section>>;

    /// All chapters ordered by `order_index`
    async fn list_chapters(&self) -> CurriculumResult<Vec<Chapter>>;

    /// All videos ordered by `order_index`
    async fn list_videos(&self) -> CurriculumResult<Vec<Video>>;

    /// Ids of videos the user has completed
    async fn completed_video_ids(&self, user_id: Uuid) -> CurriculumResult<Vec<Uuid>>;

    /// First published opener video
    async fn find_opener(&self) -> CurriculumResult<Option<Video>>;

    async fn find_video(&self, id: Uuid) -> CurriculumResult<Option<Video>>;

    /// Hierarchical entitlement check evaluated by the database
    async fn check_resource_access(&self, user_id: Uuid, video_id: Uuid) -> CurriculumResult<bool>;

    /// Upsert on (user, video). `completed` is OR-ed with the stored value.
    ///
    /// The previous completion state is read under the same row lock as the
    /// write, so only one concurrent caller sees `newly_completed`.
    async fn upsert_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        progress_seconds: i32,
        completed: bool,
    ) -> CurriculumResult<SavedProgress>;

    async fn find_profile(&self, user_id: Uuid) -> CurriculumResult<Option<Profile>>;

    /// Returns false when no profile matched
    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> CurriculumResult<bool>;

    async fn content_counts(&self) -> CurriculumResult<ContentCounts>;
}

#[derive(Default)]
struct Store {
    sections: Vec<Section>,
    chapters: Vec<Chapter>,
    videos: Vec<Video>,
    profiles: HashMap<Uuid, Profile>,
    history: HashMap<(Uuid, Uuid), WatchProgress>,
    embedded: HashSet<Uuid>,
}

/// In-memory implementation for tests and local development.
///
/// Access follows the database procedure's simplest rules: openers are
/// free and paid profiles see everything.
#[derive(Clone, Default)]
pub struct InMemoryCurriculumRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCurriculumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_section(&self, section: Section) {
        self.store.write().await.sections.push(section);
    }

    pub async fn add_chapter(&self, chapter: Chapter) {
        self.store.write().await.chapters.push(chapter);
    }

    pub async fn add_video(&self, video: Video) {
        self.store.write().await.videos.push(video);
    }

    pub async fn add_profile(&self, profile: Profile) {
        self.store.write().await.profiles.insert(profile.id, profile);
    }

    /// Count a video as indexed in [`ContentCounts::pending_embeddings`].
    pub async fn mark_embedded(&self, video_id: Uuid) {
        self.store.write().await.embedded.insert(video_id);
    }
}

fn by_order<T>(mut items: Vec<T>, key: impl Fn(&T) -> i32) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl CurriculumRepository for InMemoryCurriculumRepository {
    async fn list_sections(&self) -> CurriculumResult<Vec<Section>> {
        let store = self.store.read().await;
        Ok(by_order(store.sections.clone(), |s| s.order_index))
    }

    async fn list_chapters(&self) -> CurriculumResult<Vec<Chapter>> {
        let store = self.store.read().await;
        Ok(by_order(store.chapters.clone(), |c| c.order_index))
    }

    async fn list_videos(&self) -> CurriculumResult<Vec<Video>> {
        let store = self.store.read().await;
        Ok(by_order(store.videos.clone(), |v| v.order_index))
    }

    async fn completed_video_ids(&self, user_id: Uuid) -> CurriculumResult<Vec<Uuid>> {
        let store = self.store.read().await;
        Ok(store
            .history
            .values()
            .filter(|h| h.user_id == user_id && h.completed)
            .map(|h| h.video_id)
            .collect())
    }

    async fn find_opener(&self) -> CurriculumResult<Option<Video>> {
        let store = self.store.read().await;
        Ok(by_order(store.videos.clone(), |v| v.order_index)
            .into_iter()
            .find(|v| v.is_opener && v.is_published))
    }

    async fn find_video(&self, id: Uuid) -> CurriculumResult<Option<Video>> {
        let store = self.store.read().await;
        Ok(store.videos.iter().find(|v| v.id == id).cloned())
    }

    async fn check_resource_access(&self, user_id: Uuid, video_id: Uuid) -> CurriculumResult<bool> {
        let store = self.store.read().await;
        let paid = store.profiles.get(&user_id).is_some_and(|p| p.is_paid);
        let opener = store
            .videos
            .iter()
            .any(|v| v.id == video_id && v.is_opener);
        Ok(paid || opener)
    }

    async fn upsert_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        progress_seconds: i32,
        completed: bool,
    ) -> CurriculumResult<SavedProgress> {
        let mut store = self.store.write().await;
        let was_completed = store
            .history
            .get(&(user_id, video_id))
            .is_some_and(|row| row.completed);
        let row = store
            .history
            .entry((user_id, video_id))
            .and_modify(|row| {
                row.progress_seconds = progress_seconds;
                row.completed |= completed;
                row.updated_at = Utc::now();
            })
            .or_insert_with(|| WatchProgress {
                user_id,
                video_id,
                progress_seconds,
                completed,
                updated_at: Utc::now(),
            })
            .clone();

        tracing::info!(%user_id, %video_id, completed = row.completed, "Saved watch progress");
        Ok(SavedProgress {
            newly_completed: row.completed && !was_completed,
            progress: row,
        })
    }

    async fn find_profile(&self, user_id: Uuid) -> CurriculumResult<Option<Profile>> {
        let store = self.store.read().await;
        Ok(store.profiles.get(&user_id).cloned())
    }

    async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> CurriculumResult<bool> {
        let mut store = self.store.write().await;
        match store.profiles.get_mut(&user_id) {
            Some(profile) => {
                profile.is_paid = is_paid;
                tracing::info!(%user_id, is_paid, "Updated paid flag");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn content_counts(&self) -> CurriculumResult<ContentCounts> {
        let store = self.store.read().await;
        Ok(ContentCounts {
            users: store.profiles.len() as u64,
            videos: store.videos.len() as u64,
            pending_embeddings: store
                .videos
                .iter()
                .filter(|v| !store.embedded.contains(&v.id))
                .count() as u64,
        })
    }
}
