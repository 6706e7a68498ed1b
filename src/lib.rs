//! # taskmatch
//!
//! Assigns the tasks of a project description to the teams best suited
//! for them, by comparing text embeddings of each task against each
//! team's skill description.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ project doc  │   │  team roster │   DocumentSource (text or .pdf)
//! └──────┬───────┘   └──────┬───────┘
//!        ▼                  ▼
//!  extract_tasks     parse_team_skills    taskmatch-core (pure)
//!        │                  │
//!        └────────┬─────────┘
//!                 ▼
//!       ┌───────────────────┐    ┌──────────────┐
//!       │      Matcher      │───▶│ watsonx.ai   │  embeddings (retried)
//!       │ cosine ≥ threshold│    │ token + API  │
//!       └─────────┬─────────┘    └──────────────┘
//!                 ▼
//!          AssignmentTable ──▶ structured / natural / JSON
//!                 │
//!                 ▼
//!            Summarizer ──▶ chat model, or local fallback
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration, environment overrides, credentials |
//! | [`error`] | `MatchError` and its retry classification |
//! | [`document`] | Raw text or file input, PDF text extraction |
//! | [`retry`] | Bounded immediate retry of async operations |
//! | [`auth`] | API key → bearer token exchange and caching |
//! | [`embedding`] | `EmbeddingProvider` trait and the watsonx.ai client |
//! | [`chat`] | `ChatProvider` trait and the watsonx.ai chat client |
//! | [`watsonx`] | Builds both providers around one shared token cache |
//! | [`matcher`] | Task → team matching over embeddings |
//! | [`summary`] | Narrative summary with local fallback |
//!
//! Extraction, roster parsing, similarity and table rendering live in
//! `taskmatch-core` and are re-exported below.

pub mod auth;
pub mod chat;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod matcher;
pub mod retry;
pub mod summary;
pub mod watsonx;

pub use taskmatch_core::{aggregate, extract, models, roster, similarity};

pub use document::DocumentSource;
pub use error::MatchError;
pub use matcher::Matcher;
pub use summary::Summarizer;
