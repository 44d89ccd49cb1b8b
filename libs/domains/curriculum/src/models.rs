use chrono::{DateTime, Utc};
use domain_activity::ActivityLog;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Watched share of a video at which it counts as completed.
pub const COMPLETION_RATIO: f64 = 0.9;

/// Literal returned when a video has no transcript text.
pub const NO_TRANSCRIPT: &str = "No transcript available.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub order_index: i32,
}

/// A lesson video. The embedding column is owned by the adventure domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub transcript_text: Option<String>,
    pub cloudinary_public_id: Option<String>,
    pub chapter_id: Option<Uuid>,
    pub order_index: i32,
    pub is_opener: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Video {
    /// Minimal published video, handy for seeding.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: None,
            transcript_text: None,
            cloudinary_public_id: None,
            chapter_id: None,
            order_index: 0,
            is_opener: false,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_opener: bool,
}

impl From<Video> for VideoSummary {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            is_opener: video.is_opener,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Transcript {
    pub video_id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    pub is_paid: bool,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Row of `watch_history`, one per (user, video)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WatchProgress {
    pub user_id: Uuid,
    pub video_id: Uuid,
    pub progress_seconds: i32,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a progress upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProgress {
    pub progress: WatchProgress,
    /// This write flipped `completed` from false to true
    pub newly_completed: bool,
}

/// Body of `PUT /videos/{id}/progress`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProgressUpdate {
    #[validate(range(min = 0))]
    pub progress_seconds: i32,
    /// Total length reported by the player
    #[validate(range(exclusive_min = 0.0))]
    pub duration_seconds: Option<f64>,
    /// Player reached the end
    #[serde(default)]
    pub completed: bool,
}

impl ProgressUpdate {
    /// True when the player says so or enough of the video was watched.
    pub fn reaches_completion(&self) -> bool {
        self.completed
            || self
                .duration_seconds
                .is_some_and(|d| f64::from(self.progress_seconds) / d >= COMPLETION_RATIO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogbookVideo {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub is_opener: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogbookChapter {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub videos: Vec<LogbookVideo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LogbookSection {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub chapters: Vec<LogbookChapter>,
}

/// The learner's map of the curriculum with completion marks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Logbook {
    pub sections: Vec<LogbookSection>,
    pub completed_count: usize,
    pub total_count: usize,
}

/// `{success, url?, message?}` envelope returned by the playback gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlaybackResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PlaybackResponse {
    pub fn granted(url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            message: None,
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            message: Some(message.into()),
        }
    }
}

/// Row counts behind the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ContentCounts {
    pub users: u64,
    pub videos: u64,
    /// Videos whose embedding is still null
    pub pending_embeddings: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdminStats {
    #[serde(flatten)]
    pub counts: ContentCounts,
    pub recent_activity: Vec<ActivityLog>,
}
