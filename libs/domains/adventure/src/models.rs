use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Vector length produced by `text-embedding-004`, matching `vector(768)`.
pub const EMBEDDING_DIMENSION: usize = 768;

/// Minimum cosine similarity for a semantic recommendation.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Semantic paths offered at the crossroads.
pub const DEFAULT_RECOMMENDATION_LIMIT: u32 = 2;

/// What the pipeline needs to embed a video
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingSource {
    pub id: Uuid,
    pub title: String,
    pub transcript_text: Option<String>,
}

/// A row returned by `match_videos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Recommendation {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub similarity: f64,
}

/// A video offered as "the unknown path"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PathVideo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// `{success, message}` envelope for pipeline actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// `{success, data, message?}` envelope for semantic recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecommendationsResponse {
    pub success: bool,
    pub data: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationsResponse {
    pub fn found(data: Vec<Recommendation>) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn empty(message: Option<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            message,
        }
    }
}

/// Both choices shown after a video ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Crossroads {
    pub semantic: RecommendationsResponse,
    pub random: Option<PathVideo>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// Number of semantic matches (default 2)
    #[validate(range(min = 1, max = 20))]
    pub limit: Option<u32>,
}

/// Postgres `vector` text literal, e.g. `[0.1,0.2]`.
pub fn to_vector_literal(values: &[f32]) -> String {
    let joined = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("[{}]", joined)
}

/// Parse the text form of a `vector` column.
pub fn parse_vector_literal(text: &str) -> Option<Vec<f32>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    inner.split(',').map(|v| v.trim().parse().ok()).collect()
}
