//! # taskmatch core
//!
//! Pure, I/O-free logic for taskmatch: data models, task extraction,
//! team roster parsing, cosine similarity, and assignment rendering.
//!
//! This crate contains no tokio, reqwest, or filesystem access. Embedding
//! acquisition and the narrative summary live in the `taskmatch` app crate.

pub mod aggregate;
pub mod extract;
pub mod models;
pub mod roster;
pub mod similarity;
