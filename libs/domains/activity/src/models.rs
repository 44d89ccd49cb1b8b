use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Kind of telemetry event
///
/// `activity_logs` is shared with other writers, so values this service does
/// not emit are kept as [`EventType::Other`] instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    AiEmbeddingStart,
    AiEmbeddingSuccess,
    AiEmbeddingFailure,
    AiRecommendationGenerated,
    StudyAssetDownload,
    VideoCompleted,
    #[strum(default)]
    Other(String),
}

impl EventType {
    /// Error events from any writer, as the dashboard highlights them.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::AiEmbeddingFailure) || self.to_string().contains("ERROR")
    }
}

/// Subsystem that emitted the event; unknown values become
/// [`ActivityContext::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityContext {
    GeminiPipeline,
    AdventureEngine,
    TranscriptReader,
    VideoPlayer,
    #[strum(default)]
    Other(String),
}

macro_rules! text_column {
    ($ty:ident) => {
        impl From<String> for $ty {
            fn from(value: String) -> Self {
                match value.parse() {
                    Ok(parsed) => parsed,
                    Err(_) => Self::Other(value),
                }
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    };
}

text_column!(EventType);
text_column!(ActivityContext);

/// A stored telemetry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    /// Absent for pipeline events not tied to a signed-in user
    pub user_id: Option<Uuid>,
    #[schema(value_type = String, example = "AI_EMBEDDING_SUCCESS")]
    pub event_type: EventType,
    #[schema(value_type = String, example = "gemini_pipeline")]
    pub context: ActivityContext,
    #[schema(value_type = Object)]
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Telemetry to record
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: Option<Uuid>,
    pub event_type: EventType,
    pub context: ActivityContext,
    pub metadata: Value,
}

impl NewActivity {
    pub fn new(event_type: EventType, context: ActivityContext) -> Self {
        Self {
            user_id: None,
            event_type,
            context,
            metadata: Value::Object(Default::default()),
        }
    }

    pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Materialize with a fresh id and timestamp.
    pub fn into_log(self) -> ActivityLog {
        ActivityLog {
            id: Uuid::now_v7(),
            user_id: self.user_id,
            event_type: self.event_type,
            context: self.context,
            metadata: self.metadata,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /study-downloads`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct StudyDownload {
    pub video_id: Uuid,
    /// `transcript` or `guide` in the reader UI
    #[validate(length(min = 1, max = 64))]
    pub asset_type: String,
}
