use domain_activity::{ActivityContext, ActivityTracker, EventType, NewActivity};
use media::{DownloadRequest, MediaError, UrlSigner};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CurriculumError, CurriculumResult};
use crate::models::{
    AdminStats, Chapter, ContentCounts, Logbook, LogbookChapter, LogbookSection, LogbookVideo,
    NO_TRANSCRIPT, PlaybackResponse, ProgressUpdate, Section, Transcript, Video, VideoSummary,
    WatchProgress,
};
use crate::repository::CurriculumRepository;

/// Rows in the admin dashboard's activity feed
pub const ADMIN_RECENT_ACTIVITY: u64 = 10;

/// Service layer for curriculum browsing, playback gating and progress
#[derive(Clone)]
pub struct CurriculumService<R: CurriculumRepository> {
    repository: Arc<R>,
    signer: Arc<dyn UrlSigner>,
    activity: Arc<dyn ActivityTracker>,
}

impl<R: CurriculumRepository> CurriculumService<R> {
    pub fn new(
        repository: R,
        signer: Arc<dyn UrlSigner>,
        activity: Arc<dyn ActivityTracker>,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            signer,
            activity,
        }
    }

    /// Sections, chapters and videos with the caller's completion marks.
    pub async fn logbook(&self, user_id: Option<Uuid>) -> CurriculumResult<Logbook> {
        let sections = self.repository.list_sections().await?;
        let chapters = self.repository.list_chapters().await?;
        let videos = self.repository.list_videos().await?;
        let completed: HashSet<Uuid> = match user_id {
            Some(user_id) => self
                .repository
                .completed_video_ids(user_id)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        Ok(assemble_logbook(sections, chapters, videos, &completed))
    }

    pub async fn opener(&self) -> CurriculumResult<VideoSummary> {
        self.repository
            .find_opener()
            .await?
            .map(Into::into)
            .ok_or(CurriculumError::OpenerNotFound)
    }

    pub async fn video(&self, id: Uuid) -> CurriculumResult<VideoSummary> {
        self.find_video(id).await.map(Into::into)
    }

    pub async fn transcript(&self, id: Uuid) -> CurriculumResult<Transcript> {
        let video = self.find_video(id).await?;
        let text = video
            .transcript_text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_TRANSCRIPT.to_string());

        Ok(Transcript { video_id: id, text })
    }

    /// Gate playback behind sign-in and the database entitlement check,
    /// then hand out a signed one-hour link.
    pub async fn authorized_video_url(
        &self,
        user_id: Option<Uuid>,
        video_id: Uuid,
    ) -> PlaybackResponse {
        let Some(user_id) = user_id else {
            return PlaybackResponse::denied("Unauthorized");
        };

        match self
            .repository
            .check_resource_access(user_id, video_id)
            .await
        {
            Ok(true) => {}
            Ok(false) => return PlaybackResponse::denied("Access Denied: Payment Required"),
            Err(e) => {
                tracing::warn!(%user_id, %video_id, error = %e, "Access check failed");
                return PlaybackResponse::denied("Access Denied: Payment Required");
            }
        }

        let public_id = match self.repository.find_video(video_id).await {
            Ok(Some(video)) => video.cloudinary_public_id,
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%video_id, error = %e, "Video lookup failed");
                None
            }
        };
        let Some(public_id) = public_id else {
            return PlaybackResponse::denied("Video not found");
        };

        match self
            .signer
            .signed_download_url(&DownloadRequest::video(public_id))
        {
            Ok(url) => PlaybackResponse::granted(url),
            Err(MediaError::EmptyPublicId) => PlaybackResponse::denied("Video not found"),
            Err(e) => {
                tracing::error!(%video_id, error = %e, "Failed to sign playback URL");
                PlaybackResponse::denied(format!("Failed to sign playback URL: {}", e))
            }
        }
    }

    /// Save the player position. Completion sticks once reached.
    pub async fn record_progress(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        update: ProgressUpdate,
    ) -> CurriculumResult<WatchProgress> {
        update
            .validate()
            .map_err(|e| CurriculumError::Validation(e.to_string()))?;

        self.find_video(video_id).await?;

        let saved = self
            .repository
            .upsert_progress(
                user_id,
                video_id,
                update.progress_seconds,
                update.reaches_completion(),
            )
            .await?;
        let progress = saved.progress;

        if saved.newly_completed {
            self.activity
                .track(
                    NewActivity::new(EventType::VideoCompleted, ActivityContext::VideoPlayer)
                        .with_user(Some(user_id))
                        .with_metadata(json!({
                            "video_id": video_id,
                            "progress_seconds": progress.progress_seconds,
                        })),
                )
                .await;
        }

        Ok(progress)
    }

    pub async fn is_admin(&self, user_id: Uuid) -> CurriculumResult<bool> {
        Ok(self
            .repository
            .find_profile(user_id)
            .await?
            .is_some_and(|p| p.is_admin()))
    }

    /// Dashboard numbers. Each part degrades on its own: failed counts read
    /// as zero and a failed feed reads as empty.
    pub async fn admin_stats(&self) -> CurriculumResult<AdminStats> {
        let counts = self.repository.content_counts().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to load dashboard counts");
            ContentCounts::default()
        });
        let recent_activity = self
            .activity
            .recent(ADMIN_RECENT_ACTIVITY)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to load recent activity");
                Vec::new()
            });

        Ok(AdminStats {
            counts,
            recent_activity,
        })
    }

    /// Flip `profiles.is_paid`. Returns false when the profile does not exist.
    pub async fn set_paid(&self, user_id: Uuid, is_paid: bool) -> CurriculumResult<bool> {
        self.repository.set_paid(user_id, is_paid).await
    }

    async fn find_video(&self, id: Uuid) -> CurriculumResult<Video> {
        self.repository
            .find_video(id)
            .await?
            .ok_or(CurriculumError::VideoNotFound(id))
    }
}

/// Nest flat rows into the logbook tree. Inputs are already ordered.
fn assemble_logbook(
    sections: Vec<Section>,
    chapters: Vec<Chapter>,
    videos: Vec<Video>,
    completed: &HashSet<Uuid>,
) -> Logbook {
    let mut videos_by_chapter: HashMap<Uuid, Vec<LogbookVideo>> = HashMap::new();
    for video in videos {
        let Some(chapter_id) = video.chapter_id else {
            continue;
        };
        videos_by_chapter
            .entry(chapter_id)
            .or_default()
            .push(LogbookVideo {
                completed: completed.contains(&video.id),
                id: video.id,
                title: video.title,
                order_index: video.order_index,
                is_opener: video.is_opener,
            });
    }

    let mut chapters_by_section: HashMap<Uuid, Vec<LogbookChapter>> = HashMap::new();
    for chapter in chapters {
        chapters_by_section
            .entry(chapter.section_id)
            .or_default()
            .push(LogbookChapter {
                videos: videos_by_chapter.remove(&chapter.id).unwrap_or_default(),
                id: chapter.id,
                title: chapter.title,
                order_index: chapter.order_index,
            });
    }

    let sections: Vec<LogbookSection> = sections
        .into_iter()
        .map(|section| LogbookSection {
            chapters: chapters_by_section.remove(&section.id).unwrap_or_default(),
            id: section.id,
            title: section.title,
            order_index: section.order_index,
        })
        .collect();

    let all_videos = || {
        sections
            .iter()
            .flat_map(|s| &s.chapters)
            .flat_map(|c| &c.videos)
    };
    let total_count = all_videos().count();
    let completed_count = all_videos().filter(|v| v.completed).count();

    Logbook {
        sections,
        completed_count,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Profile, SavedProgress};
    use crate::repository::{InMemoryCurriculumRepository, MockCurriculumRepository};
    use domain_activity::{ActivityService, InMemoryActivityRepository};
    use media::{DownloadRequest, MediaResult};

    struct FixedSigner;

    impl UrlSigner for FixedSigner {
        fn signed_download_url(&self, request: &DownloadRequest) -> MediaResult<String> {
            if request.public_id.is_empty() {
                return Err(MediaError::EmptyPublicId);
            }
            Ok(format!("https://cdn.test/{}.{}", request.public_id, request.format))
        }
    }

    fn service_with(
        repo: MockCurriculumRepository,
    ) -> (
        CurriculumService<MockCurriculumRepository>,
        InMemoryActivityRepository,
    ) {
        let activity_repo = InMemoryActivityRepository::new();
        let activity = Arc::new(ActivityService::new(activity_repo.clone()));
        (
            CurriculumService::new(repo, Arc::new(FixedSigner), activity),
            activity_repo,
        )
    }

    fn video_with_asset(id: Uuid, public_id: Option<&str>) -> Video {
        let mut video = Video::new("Hip hinge");
        video.id = id;
        video.cloudinary_public_id = public_id.map(str::to_string);
        video
    }

    fn saved(
        user_id: Uuid,
        video_id: Uuid,
        progress_seconds: i32,
        newly_completed: bool,
    ) -> SavedProgress {
        SavedProgress {
            progress: WatchProgress {
                user_id,
                video_id,
                progress_seconds,
                completed: true,
                updated_at: chrono::Utc::now(),
            },
            newly_completed,
        }
    }

    #[tokio::test]
    async fn test_playback_requires_user() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_check_resource_access().never();

        let (service, _) = service_with(repo);
        let response = service.authorized_video_url(None, Uuid::now_v7()).await;
        assert_eq!(response, PlaybackResponse::denied("Unauthorized"));
    }

    #[tokio::test]
    async fn test_playback_denied_without_entitlement() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_check_resource_access().returning(|_, _| Ok(false));
        repo.expect_find_video().never();

        let (service, _) = service_with(repo);
        let response = service
            .authorized_video_url(Some(Uuid::now_v7()), Uuid::now_v7())
            .await;
        assert_eq!(response.message.as_deref(), Some("Access Denied: Payment Required"));
        assert!(!response.success);
    }

    #[tokio::test]
    async fn test_playback_denied_when_access_rpc_fails() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_check_resource_access()
            .returning(|_, _| Err(CurriculumError::Internal("function missing".into())));

        let (service, _) = service_with(repo);
        let response = service
            .authorized_video_url(Some(Uuid::now_v7()), Uuid::now_v7())
            .await;
        assert_eq!(response.message.as_deref(), Some("Access Denied: Payment Required"));
    }

    #[tokio::test]
    async fn test_playback_missing_asset_is_not_found() {
        let video_id = Uuid::now_v7();
        let mut repo = MockCurriculumRepository::new();
        repo.expect_check_resource_access().returning(|_, _| Ok(true));
        repo.expect_find_video()
            .returning(move |id| Ok(Some(video_with_asset(id, None))));

        let (service, _) = service_with(repo);
        let response = service
            .authorized_video_url(Some(Uuid::now_v7()), video_id)
            .await;
        assert_eq!(response, PlaybackResponse::denied("Video not found"));
    }

    #[tokio::test]
    async fn test_playback_grants_signed_url() {
        let video_id = Uuid::now_v7();
        let mut repo = MockCurriculumRepository::new();
        repo.expect_check_resource_access()
            .with(
                mockall::predicate::always(),
                mockall::predicate::eq(video_id),
            )
            .returning(|_, _| Ok(true));
        repo.expect_find_video()
            .returning(|id| Ok(Some(video_with_asset(id, Some("academy/hinge")))));

        let (service, _) = service_with(repo);
        let response = service
            .authorized_video_url(Some(Uuid::now_v7()), video_id)
            .await;
        assert_eq!(
            response,
            PlaybackResponse::granted("https://cdn.test/academy/hinge.mp4".into())
        );
    }

    #[tokio::test]
    async fn test_transcript_falls_back_to_literal() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video().returning(|id| {
            let mut video = video_with_asset(id, None);
            video.transcript_text = Some(String::new());
            Ok(Some(video))
        });

        let (service, _) = service_with(repo);
        let transcript = service.transcript(Uuid::now_v7()).await.unwrap();
        assert_eq!(transcript.text, NO_TRANSCRIPT);
    }

    #[tokio::test]
    async fn test_transcript_keeps_whitespace_text() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video().returning(|id| {
            let mut video = video_with_asset(id, None);
            video.transcript_text = Some("   ".into());
            Ok(Some(video))
        });

        let (service, _) = service_with(repo);
        let transcript = service.transcript(Uuid::now_v7()).await.unwrap();
        assert_eq!(transcript.text, "   ");
    }

    #[tokio::test]
    async fn test_transcript_unknown_video() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video().returning(|_| Ok(None));

        let (service, _) = service_with(repo);
        let err = service.transcript(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, CurriculumError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_opener_not_found() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_opener().returning(|| Ok(None));

        let (service, _) = service_with(repo);
        assert!(matches!(
            service.opener().await,
            Err(CurriculumError::OpenerNotFound)
        ));
    }

    #[tokio::test]
    async fn test_first_completion_is_tracked_once() {
        let user_id = Uuid::now_v7();
        let video_id = Uuid::now_v7();
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video()
            .returning(|id| Ok(Some(video_with_asset(id, None))));
        repo.expect_upsert_progress()
            .with(
                mockall::predicate::eq(user_id),
                mockall::predicate::eq(video_id),
                mockall::predicate::eq(270),
                mockall::predicate::eq(true),
            )
            .returning(|user_id, video_id, progress_seconds, _| {
                Ok(saved(user_id, video_id, progress_seconds, true))
            });

        let (service, activity) = service_with(repo);
        let progress = service
            .record_progress(
                user_id,
                video_id,
                ProgressUpdate {
                    progress_seconds: 270,
                    duration_seconds: Some(300.0),
                    completed: false,
                },
            )
            .await
            .unwrap();
        assert!(progress.completed);

        use domain_activity::ActivityRepository;
        let logs = activity.recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event_type, EventType::VideoCompleted);
        assert_eq!(logs[0].context, ActivityContext::VideoPlayer);
    }

    #[tokio::test]
    async fn test_rewatch_of_completed_video_is_not_tracked_again() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video()
            .returning(|id| Ok(Some(video_with_asset(id, None))));
        repo.expect_upsert_progress()
            .returning(|user_id, video_id, progress_seconds, _| {
                Ok(saved(user_id, video_id, progress_seconds, false))
            });

        let (service, activity) = service_with(repo);
        let progress = service
            .record_progress(
                Uuid::now_v7(),
                Uuid::now_v7(),
                ProgressUpdate {
                    progress_seconds: 12,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(progress.completed);

        use domain_activity::ActivityRepository;
        assert!(activity.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_racing_completions_are_tracked_once() {
        let repo = InMemoryCurriculumRepository::new();
        let video = Video::new("Hip hinge");
        let video_id = video.id;
        repo.add_video(video).await;

        let activity_repo = InMemoryActivityRepository::new();
        let service = CurriculumService::new(
            repo,
            Arc::new(FixedSigner),
            Arc::new(ActivityService::new(activity_repo.clone())),
        );
        let user_id = Uuid::now_v7();
        let finish = || ProgressUpdate {
            progress_seconds: 300,
            completed: true,
            ..Default::default()
        };

        let (a, b) = tokio::join!(
            service.record_progress(user_id, video_id, finish()),
            service.record_progress(user_id, video_id, finish()),
        );
        assert!(a.unwrap().completed && b.unwrap().completed);

        use domain_activity::ActivityRepository;
        let logs = activity_repo.recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].event_type, EventType::VideoCompleted);
    }

    #[tokio::test]
    async fn test_progress_for_unknown_video() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_video().returning(|_| Ok(None));
        repo.expect_upsert_progress().never();

        let (service, _) = service_with(repo);
        let err = service
            .record_progress(Uuid::now_v7(), Uuid::now_v7(), ProgressUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CurriculumError::VideoNotFound(_)));
    }

    #[tokio::test]
    async fn test_is_admin_reads_role() {
        let admin = Uuid::now_v7();
        let mut repo = MockCurriculumRepository::new();
        repo.expect_find_profile().returning(move |id| {
            Ok(Some(Profile {
                id,
                email: None,
                full_name: None,
                role: if id == admin { "admin" } else { "member" }.into(),
                is_paid: true,
            }))
        });

        let (service, _) = service_with(repo);
        assert!(service.is_admin(admin).await.unwrap());
        assert!(!service.is_admin(Uuid::now_v7()).await.unwrap());
    }

    #[tokio::test]
    async fn test_admin_stats_combines_counts_and_activity() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_content_counts().returning(|| {
            Ok(ContentCounts {
                users: 4,
                videos: 12,
                pending_embeddings: 3,
            })
        });

        let (service, activity) = service_with(repo);
        use domain_activity::ActivityRepository;
        for _ in 0..12 {
            activity
                .insert(NewActivity::new(
                    EventType::AiEmbeddingStart,
                    ActivityContext::GeminiPipeline,
                ))
                .await
                .unwrap();
        }

        let stats = service.admin_stats().await.unwrap();
        assert_eq!(stats.counts.videos, 12);
        assert_eq!(stats.counts.pending_embeddings, 3);
        assert_eq!(stats.recent_activity.len(), ADMIN_RECENT_ACTIVITY as usize);
    }

    struct UnavailableActivity;

    #[async_trait::async_trait]
    impl ActivityTracker for UnavailableActivity {
        async fn track(&self, _activity: NewActivity) {}

        async fn recent(&self, _limit: u64) -> domain_activity::ActivityResult<Vec<domain_activity::ActivityLog>> {
            Err(domain_activity::ActivityError::Internal(
                "unexpected value in activity_logs".into(),
            ))
        }
    }

    #[tokio::test]
    async fn test_admin_stats_survives_failing_parts() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_content_counts()
            .returning(|| Err(CurriculumError::Internal("connection reset".into())));
        let service =
            CurriculumService::new(repo, Arc::new(FixedSigner), Arc::new(UnavailableActivity));

        let stats = service.admin_stats().await.unwrap();
        assert_eq!(stats.counts, ContentCounts::default());
        assert!(stats.recent_activity.is_empty());
    }

    #[tokio::test]
    async fn test_admin_stats_lists_foreign_event_types() {
        let mut repo = MockCurriculumRepository::new();
        repo.expect_content_counts()
            .returning(|| Ok(ContentCounts::default()));

        let (service, activity) = service_with(repo);
        use domain_activity::ActivityRepository;
        activity
            .insert(NewActivity::new(
                EventType::Other("PAYMENT_SYNC_ERROR".into()),
                ActivityContext::Other("billing_worker".into()),
            ))
            .await
            .unwrap();

        let stats = service.admin_stats().await.unwrap();
        assert_eq!(stats.recent_activity.len(), 1);
        assert!(stats.recent_activity[0].event_type.is_error());
    }

    #[test]
    fn test_assemble_logbook_nests_and_counts() {
        let section = Section {
            id: Uuid::now_v7(),
            title: "Foundations".into(),
            order_index: 0,
        };
        let chapter = Chapter {
            id: Uuid::now_v7(),
            section_id: section.id,
            title: "Mobility".into(),
            order_index: 0,
        };
        let mut first = Video::new("Ankles");
        first.chapter_id = Some(chapter.id);
        let mut second = Video::new("Hips");
        second.chapter_id = Some(chapter.id);
        second.order_index = 1;
        let orphan = Video::new("Unfiled");

        let completed = HashSet::from([first.id]);
        let logbook = assemble_logbook(
            vec![section.clone()],
            vec![chapter],
            vec![first.clone(), second, orphan],
            &completed,
        );

        assert_eq!(logbook.total_count, 2);
        assert_eq!(logbook.completed_count, 1);
        let videos = &logbook.sections[0].chapters[0].videos;
        assert_eq!(videos[0].id, first.id);
        assert!(videos[0].completed);
        assert!(!videos[1].completed);
    }
}
