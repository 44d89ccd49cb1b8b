mod gemini;
mod provider;

pub use gemini::GeminiProvider;
pub use provider::{EmbeddingProvider, MAX_EMBEDDING_INPUT_CHARS, prepare_embedding_input};

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
