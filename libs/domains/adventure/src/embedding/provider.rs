use async_trait::async_trait;

use crate::error::AdventureResult;

/// Longest input sent to the provider, in characters.
pub const MAX_EMBEDDING_INPUT_CHARS: usize = 30_000;

/// Trait for embedding generation providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one document
    async fn embed(&self, text: &str) -> AdventureResult<Vec<f32>>;
}

/// Build the document embedded for a video: title and transcript, whitespace
/// runs collapsed, trimmed and capped at [`MAX_EMBEDDING_INPUT_CHARS`].
pub fn prepare_embedding_input(title: &str, transcript: &str) -> String {
    let raw = format!("Title: {}\n\nContent: {}", title, transcript);
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_EMBEDDING_INPUT_CHARS)
        .collect()
}
