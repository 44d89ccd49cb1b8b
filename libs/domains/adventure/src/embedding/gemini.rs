//! Gemini embedding provider
//!
//! Calls the Generative Language API `embedContent` method. The API key goes
//! in the `x-goog-api-key` header so it never appears in a request URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::GeminiConfig;
use crate::error::{AdventureError, AdventureResult};

/// Gemini embeddings provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }
}

// Gemini request/response types

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

fn request_body(text: &str) -> EmbedContentRequest<'_> {
    EmbedContentRequest {
        content: Content {
            parts: [Part { text }],
        },
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiProvider {
    async fn embed(&self, text: &str) -> AdventureResult<Vec<f32>> {
        let response = self
            .client
            .post(self.config.endpoint_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdventureError::Embedding(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbedContentResponse = response.json().await?;
        if body.embedding.values.is_empty() {
            return Err(AdventureError::Embedding(
                "No embedding returned".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.config.model,
            dimension = body.embedding.values.len(),
            "Generated embedding"
        );
        Ok(body.embedding.values)
    }
}
