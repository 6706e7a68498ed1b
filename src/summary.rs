//! Narrative summary of an assignment table.
//!
//! Sends the table to a [`ChatProvider`] as a single user message and
//! returns the generated prose. Only gateway timeouts (HTTP 504 or a
//! request timeout) are retried; any other failure, or running out of
//! attempts, falls back to the local natural-language rendering prefixed
//! with [`LOCAL_SUMMARY_PREFIX`]. A summary never returns an error.

use std::fmt;

use taskmatch_core::aggregate::{format_percent, format_results_natural};
use taskmatch_core::models::AssignmentTable;

use crate::chat::{ChatMessage, ChatProvider};
use crate::error::MatchError;
use crate::retry::{retry, RetryPolicy};

pub const NO_SUMMARY_MESSAGE: &str = "No task assignments available to summarize.";
pub const LOCAL_SUMMARY_PREFIX: &str = "Local Summary: ";
pub const DEFAULT_SUMMARY_ATTEMPTS: u32 = 2;

/// Where a summary came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    /// The table had no matches; the provider was not called.
    Empty,
    /// Text produced by the chat model.
    Generated(String),
    /// Local rendering used after the provider failed.
    LocalFallback(String),
}

impl Narrative {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Narrative::LocalFallback(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Narrative::Generated(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Narrative::Empty => f.write_str(NO_SUMMARY_MESSAGE),
            Narrative::Generated(text) => f.write_str(text),
            Narrative::LocalFallback(text) => write!(f, "{}{}", LOCAL_SUMMARY_PREFIX, text),
        }
    }
}

/// Build the prompt listing every team with matches and its scored tasks.
pub fn build_prompt(table: &AssignmentTable) -> String {
    let lines: Vec<String> = table
        .teams()
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| {
            let tasks: Vec<String> = t
                .matches()
                .iter()
                .map(|m| format!("{} ({})", m.task, format_percent(m.score)))
                .collect();
            format!("{}: {}", t.team(), tasks.join("; "))
        })
        .collect();

    format!(
        "Based on the following task assignments between teams and tasks with their \
         confidence scores:\n\n{}\n\nPlease provide a detailed, natural language summary \
         explaining which teams are best suited for which tasks, including any context or \
         recommendations you deem useful.",
        lines.join("\n")
    )
}

/// Turns an [`AssignmentTable`] into prose via a chat model.
pub struct Summarizer<'c> {
    provider: &'c dyn ChatProvider,
    policy: RetryPolicy,
}

impl<'c> Summarizer<'c> {
    pub fn new(provider: &'c dyn ChatProvider) -> Self {
        Self {
            provider,
            policy: RetryPolicy::new(DEFAULT_SUMMARY_ATTEMPTS),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy = RetryPolicy::new(max_attempts);
        self
    }

    /// Summarize the table as display text.
    pub async fn summarize(&self, table: &AssignmentTable) -> String {
        self.narrate(table).await.into_text()
    }

    /// Summarize the table, reporting whether the model or the local
    /// fallback produced the text.
    pub async fn narrate(&self, table: &AssignmentTable) -> Narrative {
        if !table.has_matches() {
            return Narrative::Empty;
        }

        let messages = [ChatMessage::user(build_prompt(table))];
        let messages = &messages;
        let provider = self.provider;
        let result = retry(
            self.policy,
            MatchError::is_gateway_timeout,
            |attempt, err| {
                tracing::warn!(attempt, error = %err, "chat summary timed out; retrying");
            },
            move |_| provider.chat(messages),
        )
        .await;

        match result {
            Ok(text) => Narrative::Generated(text),
            Err(e) => {
                tracing::error!(error = %e, "error generating chat summary; using local summary");
                Narrative::LocalFallback(format_results_natural(table))
            }
        }
    }
}
