//! Text-generation provider used by the narrative summary.
//!
//! [`WatsonxChat`] makes one HTTP call per [`ChatProvider::chat`], plus a
//! single resend with a freshly exchanged token when the first answer is
//! HTTP 401. Retrying on other failures is the caller's decision (see
//! [`crate::summary`]).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenManager;
use crate::config::{SummaryConfig, WatsonxConfig};
use crate::error::MatchError;

const ENDPOINT: &str = "chat";

/// A single chat message (`role` is `"system"`, `"user"` or `"assistant"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Generates a reply for a conversation.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, MatchError>;
}

/// Generation parameters sent with every chat request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub time_limit_ms: u64,
}

impl From<&SummaryConfig> for GenerationParams {
    fn from(config: &SummaryConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            time_limit_ms: config.time_limit_ms,
        }
    }
}

/// watsonx.ai `text/chat` client.
pub struct WatsonxChat {
    client: reqwest::Client,
    tokens: Arc<TokenManager>,
    url: String,
    model: String,
    timeout: Duration,
    params: GenerationParams,
}

impl WatsonxChat {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenManager>,
        config: &WatsonxConfig,
        params: GenerationParams,
    ) -> Self {
        Self {
            client,
            tokens,
            url: config.chat_url.clone(),
            model: config.chat_model.clone(),
            timeout: config.chat_timeout(),
            params,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
    time_limit: u64,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl WatsonxChat {
    async fn send(
        &self,
        token: &str,
        messages: &[ChatMessage],
    ) -> Result<reqwest::Response, MatchError> {
        let request = ChatRequest {
            model_id: &self.model,
            project_id: self.tokens.project_id(),
            messages,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            time_limit: self.params.time_limit_ms,
        };

        Ok(self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await?)
    }
}

#[async_trait]
impl ChatProvider for WatsonxChat {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, MatchError> {
        let token = self.tokens.ensure_token().await?;
        let mut response = self.send(&token, messages).await?;

        // Stale token: exchange once and resend.
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::info!("chat API rejected token; refreshing");
            let token = self.tokens.refresh().await?;
            response = self.send(&token, messages).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate();
            return Err(MatchError::TokenRejected { endpoint: ENDPOINT });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchError::Provider {
                endpoint: ENDPOINT,
                status,
                body,
            });
        }

        let bytes = response.bytes().await?;
        parse_chat_response(&bytes)
    }
}

/// Extract `choices[0].message.content`.
fn parse_chat_response(bytes: &[u8]) -> Result<String, MatchError> {
    let parsed: ChatResponse =
        serde_json::from_slice(bytes).map_err(|e| MatchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: e.to_string(),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| MatchError::MalformedResponse {
            endpoint: ENDPOINT,
            detail: "empty choices array".to_string(),
        })
}
