//! Shared construction of the watsonx.ai providers.
//!
//! One `reqwest::Client` and one [`TokenManager`] back both the embedding
//! and the chat provider, so a token fetched while matching is reused by
//! the summary.

use std::sync::Arc;

use crate::auth::TokenManager;
use crate::chat::{GenerationParams, WatsonxChat};
use crate::config::{Config, Credentials};
use crate::embedding::WatsonxEmbedder;
use crate::error::MatchError;

/// The providers a match run needs, sharing one token cache.
pub struct WatsonxClients {
    pub tokens: Arc<TokenManager>,
    pub embedder: WatsonxEmbedder,
    pub chat: WatsonxChat,
}

impl WatsonxClients {
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, MatchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MatchError::Config(format!("failed to build HTTP client: {}", e)))?;

        let w = &config.watsonx;
        let tokens = Arc::new(TokenManager::new(
            client.clone(),
            credentials,
            w.token_url.clone(),
            w.auth_timeout(),
        ));
        let embedder = WatsonxEmbedder::new(client.clone(), Arc::clone(&tokens), w);
        let chat = WatsonxChat::new(
            client,
            Arc::clone(&tokens),
            w,
            GenerationParams::from(&config.summary),
        );

        Ok(Self {
            tokens,
            embedder,
            chat,
        })
    }

    /// Build the providers with credentials read from the environment.
    pub fn from_env(config: &Config) -> Result<Self, MatchError> {
        Self::new(config, Credentials::from_env()?)
    }
}
