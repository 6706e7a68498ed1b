//! Bearer-token management for the watsonx.ai endpoints.
//!
//! The long-lived API key is exchanged at the IAM token endpoint for a
//! short-lived bearer token. The token is cached on the [`TokenManager`]
//! and reused until a caller discards it with [`TokenManager::invalidate`].
//!
//! Refreshes are serialized: concurrent callers that find no cached token
//! wait on a single exchange instead of racing each other.

use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::config::Credentials;
use crate::error::MatchError;

pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Owns the credentials and the cached bearer token.
pub struct TokenManager {
    client: reqwest::Client,
    credentials: Credentials,
    token_url: String,
    timeout: Duration,
    token: Mutex<Option<String>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl TokenManager {
    pub fn new(
        client: reqwest::Client,
        credentials: Credentials,
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            credentials,
            token_url: token_url.into(),
            timeout,
            token: Mutex::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }

    /// Return the cached token, exchanging the API key if there is none.
    pub async fn ensure_token(&self) -> Result<String, MatchError> {
        if let Some(token) = self.cached() {
            return Ok(token);
        }
        let _guard = self.refresh_lock.lock().await;
        if let Some(token) = self.cached() {
            return Ok(token);
        }
        self.exchange_and_store().await
    }

    /// Exchange the API key for a fresh token, replacing any cached one.
    pub async fn refresh(&self) -> Result<String, MatchError> {
        let _guard = self.refresh_lock.lock().await;
        self.exchange_and_store().await
    }

    /// Drop the cached token; the next [`ensure_token`](Self::ensure_token)
    /// performs a new exchange.
    pub fn invalidate(&self) {
        *self.slot() = None;
    }

    pub fn has_token(&self) -> bool {
        self.slot().is_some()
    }

    fn cached(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // The guarded value is a plain Option; a poisoned lock is still usable.
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn exchange_and_store(&self) -> Result<String, MatchError> {
        tracing::info!("requesting new IBM access token");
        let token = self.exchange().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to get IBM token");
        })?;
        *self.slot() = Some(token.clone());
        Ok(token)
    }

    async fn exchange(&self) -> Result<String, MatchError> {
        let response = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", APIKEY_GRANT_TYPE),
                ("apikey", self.credentials.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MatchError::AuthFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MatchError::AuthFailure(format!("{}: {}", status, body)));
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|e| MatchError::AuthFailure(format!("invalid token response: {}", e)))?;

        if parsed.access_token.is_empty() {
            return Err(MatchError::AuthFailure(
                "token response has no access_token".to_string(),
            ));
        }
        Ok(parsed.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(url: &str) -> TokenManager {
        TokenManager::new(
            reqwest::Client::new(),
            Credentials::new("key", "proj"),
            url,
            Duration::from_millis(200),
        )
    }

    #[test]
    fn invalidate_clears_cache() {
        let tm = manager("http://127.0.0.1:9/token");
        *tm.slot() = Some("cached".to_string());
        assert!(tm.has_token());
        tm.invalidate();
        assert!(!tm.has_token());
    }

    #[tokio::test]
    async fn cached_token_skips_exchange() {
        // Port 9 (discard) is never listening; a real exchange would fail.
        let tm = manager("http://127.0.0.1:9/token");
        *tm.slot() = Some("cached".to_string());
        assert_eq!(tm.ensure_token().await.unwrap(), "cached");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_auth_failure() {
        let tm = manager("http://127.0.0.1:9/token");
        let err = tm.ensure_token().await.unwrap_err();
        assert!(matches!(err, MatchError::AuthFailure(_)));
        assert!(!tm.has_token());
    }
}
