//! Embedding provider abstraction and the watsonx.ai implementation.
//!
//! Defines the [`EmbeddingProvider`] trait and:
//! - **[`WatsonxEmbedder`]**: calls the watsonx.ai `text/embeddings`
//!   endpoint with a cached bearer token and bounded retries.
//!
//! # Retry Strategy
//!
//! Up to `watsonx.embed_max_attempts` attempts (default 3), no backoff:
//! - Network error or timeout → discard token, retry
//! - Token exchange failure → discard token, retry
//! - HTTP 401 → discard token, retry
//! - Any other non-success status → fail immediately, no retry
//! - Success without `results[0].embedding` → fail immediately
//!
//! The token is discarded after every retried failure, including plain
//! network errors.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use taskmatch_core::models::Embedding;

use crate::auth::TokenManager;
use crate::config::WatsonxConfig;
use crate::error::MatchError;
use crate::retry::{retry, RetryPolicy};

const ENDPOINT: &str = "embeddings";

/// Produces an embedding vector for a piece of text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Embedding, MatchError>;

    /// Returns the model identifier (e.g. `"ibm/granite-embedding-107m-multilingual"`).
    fn model_name(&self) -> &str;
}

/// watsonx.ai embeddings client.
pub struct WatsonxEmbedder {
    client: reqwest::Client,
    tokens: Arc<TokenManager>,
    url: String,
    model: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl WatsonxEmbedder {
    pub fn new(client: reqwest::Client, tokens: Arc<TokenManager>, config: &WatsonxConfig) -> Self {
        Self {
            client,
            tokens,
            url: config.embeddings_url.clone(),
            model: config.embedding_model.clone(),
            timeout: config.embed_timeout(),
            policy: RetryPolicy::new(config.embed_max_attempts),
        }
    }

    async fn attempt(&self, text: &str) -> Result<Embedding, MatchError> {
        let token = self.tokens.ensure_token().await?;

        let body = serde_json::json!({
            "model_id": self.model,
            "project_id": self.tokens.project_id(),
            "inputs": [text],
        });

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MatchError::TokenRejected { endpoint: ENDPOINT });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "embeddings API returned error status");
            return Err(MatchError::Provider {
                endpoint: ENDPOINT,
                status,
                body,
            });
        }

        let bytes = response.bytes().await?;
        parse_embedding_response(&bytes)
    }
}

#[async_trait]
impl EmbeddingProvider for WatsonxEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding, MatchError> {
        retry(
            self.policy,
            MatchError::is_transient,
            move |attempt, err| {
                tracing::warn!(attempt, error = %err, "embedding request failed; resetting token");
                self.tokens.invalidate();
            },
            move |attempt| {
                tracing::info!(attempt, model = self.model_name(), "requesting embedding");
                self.attempt(text)
            },
        )
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    results: Vec<EmbeddingResult>,
}

#[derive(Deserialize)]
struct EmbeddingResult {
    embedding: Vec<f32>,
}

/// Extract `results[0].embedding` from an embeddings response.
fn parse_embedding_response(bytes: &[u8]) -> Result<Embedding, MatchError> {
    let parsed: EmbeddingsResponse =
        serde_json::from_slice(bytes).map_err(|e| MatchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: e.to_string(),
        })?;

    parsed
        .results
        .into_iter()
        .next()
        .map(|r| r.embedding)
        .ok_or_else(|| MatchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: "empty results array".to_string(),
        })
}
