use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "text-embedding-004";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini embedding API settings.
///
/// Environment variables:
/// - `GEMINI_API_KEY` (required)
/// - `GEMINI_EMBEDDING_MODEL` (default `text-embedding-004`)
/// - `GEMINI_API_BASE` (default `https://generativelanguage.googleapis.com`)
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// `embedContent` endpoint for the configured model, without the key.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:embedContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

impl FromEnv for GeminiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("GEMINI_API_KEY")?,
            model: env_or_default("GEMINI_EMBEDDING_MODEL", DEFAULT_GEMINI_MODEL),
            api_base: env_or_default("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
        })
    }
}

/// Embedding pipeline settings.
///
/// `EMBEDDING_BULK_DELAY_MS` (default 1000) spaces out bulk requests to stay
/// under the provider's rate limit.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub bulk_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bulk_delay: Duration::from_millis(1000),
        }
    }
}

impl FromEnv for PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let millis = env_parse("EMBEDDING_BULK_DELAY_MS", 1000u64)?;
        Ok(Self {
            bulk_delay: Duration::from_millis(millis),
        })
    }
}
