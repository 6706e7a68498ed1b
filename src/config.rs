//! Configuration loading.
//!
//! Settings come from an optional TOML file; every section and field has a
//! default. URL overrides and credentials come from the environment
//! (`.env` is loaded by the binary before this runs).
//!
//! ```toml
//! [watsonx]
//! embedding_model = "ibm/granite-embedding-107m-multilingual"
//! embed_timeout_ms = 15000
//!
//! [matching]
//! threshold = 0.7
//!
//! [summary]
//! enabled = true
//! max_attempts = 2
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::MatchError;

pub const ENV_API_KEY: &str = "IBM_API_KEY";
pub const ENV_PROJECT_ID: &str = "IBM_PROJECT_ID";
pub const ENV_URL_TOKEN: &str = "IBM_URL_TOKEN";
pub const ENV_URL_EMBEDDINGS: &str = "IBM_URL_EMBEDDINGS";
pub const ENV_URL_CHAT: &str = "IBM_URL_CHAT";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub watsonx: WatsonxConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WatsonxConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_embeddings_url")]
    pub embeddings_url: String,
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_auth_timeout_ms")]
    pub auth_timeout_ms: u64,
    #[serde(default = "default_embed_timeout_ms")]
    pub embed_timeout_ms: u64,
    #[serde(default = "default_chat_timeout_ms")]
    pub chat_timeout_ms: u64,
    #[serde(default = "default_embed_max_attempts")]
    pub embed_max_attempts: u32,
}

impl Default for WatsonxConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            embeddings_url: default_embeddings_url(),
            chat_url: default_chat_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            auth_timeout_ms: default_auth_timeout_ms(),
            embed_timeout_ms: default_embed_timeout_ms(),
            chat_timeout_ms: default_chat_timeout_ms(),
            embed_max_attempts: default_embed_max_attempts(),
        }
    }
}

impl WatsonxConfig {
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }
    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms)
    }
}

fn default_token_url() -> String {
    "https://iam.cloud.ibm.com/identity/token".to_string()
}
fn default_embeddings_url() -> String {
    "https://us-south.ml.cloud.ibm.com/ml/v1/text/embeddings?version=2023-10-25".to_string()
}
fn default_chat_url() -> String {
    "https://us-south.ml.cloud.ibm.com/ml/v1/text/chat?version=2023-10-25".to_string()
}
fn default_embedding_model() -> String {
    "ibm/granite-embedding-107m-multilingual".to_string()
}
fn default_chat_model() -> String {
    "ibm/granite-3-8b-instruct".to_string()
}
fn default_auth_timeout_ms() -> u64 {
    10_000
}
fn default_embed_timeout_ms() -> u64 {
    15_000
}
fn default_chat_timeout_ms() -> u64 {
    60_000
}
fn default_embed_max_attempts() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    0.7
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_enabled")]
    pub enabled: bool,
    #[serde(default = "default_summary_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_time_limit_ms")]
    pub time_limit_ms: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_summary_enabled(),
            max_attempts: default_summary_max_attempts(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            time_limit_ms: default_time_limit_ms(),
        }
    }
}

fn default_summary_enabled() -> bool {
    true
}
fn default_summary_max_attempts() -> u32 {
    2
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_temperature() -> f64 {
    0.7
}
fn default_time_limit_ms() -> u64 {
    5000
}

/// Long-lived credentials for the token exchange.
///
/// `Debug` redacts the API key.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub project_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
        }
    }

    /// Read `IBM_API_KEY` and `IBM_PROJECT_ID` from the environment.
    ///
    /// # Errors
    ///
    /// [`MatchError::Config`] naming every variable that is missing or blank.
    pub fn from_env() -> Result<Self, MatchError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MatchError> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key = read(ENV_API_KEY);
        let project_id = read(ENV_PROJECT_ID);

        match (api_key, project_id) {
            (Some(api_key), Some(project_id)) => Ok(Self::new(api_key, project_id)),
            (api_key, project_id) => {
                let missing: Vec<&str> = [
                    api_key.is_none().then_some(ENV_API_KEY),
                    project_id.is_none().then_some(ENV_PROJECT_ID),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(MatchError::Config(format!(
                    "missing environment variable(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Load configuration from `path`.
///
/// A missing file is only accepted when `required` is false, in which case
/// defaults are used. Environment URL overrides are applied afterwards.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    let mut config = if path.exists() || required {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        parse_config(&content)?
    } else {
        Config::default()
    };

    config.apply_env_overrides(|name| std::env::var(name).ok());
    validate(&config)?;
    Ok(config)
}

/// Parse TOML without touching the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

impl Config {
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let slots = [
            (ENV_URL_TOKEN, &mut self.watsonx.token_url),
            (ENV_URL_EMBEDDINGS, &mut self.watsonx.embeddings_url),
            (ENV_URL_CHAT, &mut self.watsonx.chat_url),
        ];
        for (name, slot) in slots {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }
}

fn validate(config: &Config) -> Result<()> {
    let w = &config.watsonx;
    if w.embed_max_attempts == 0 {
        bail!("watsonx.embed_max_attempts must be >= 1");
    }
    if w.auth_timeout_ms == 0 || w.embed_timeout_ms == 0 || w.chat_timeout_ms == 0 {
        bail!("watsonx timeouts must be > 0");
    }

    if !config.matching.threshold.is_finite() {
        bail!("matching.threshold must be a finite number");
    }

    let s = &config.summary;
    if s.max_attempts == 0 {
        bail!("summary.max_attempts must be >= 1");
    }
    if !(0.0..=2.0).contains(&s.temperature) {
        bail!("summary.temperature must be in [0.0, 2.0]");
    }

    Ok(())
}
