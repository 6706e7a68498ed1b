//! Cosine similarity between embedding vectors.
//!
//! ```text
//!            a · b
//! cos(θ) = ─────────
//!          ‖a‖ × ‖b‖
//! ```
//!
//! A zero or non-finite norm is reported as
//! [`SimilarityError::DegenerateVector`], never as a NaN or a `0.0` score.

use thiserror::Error;

/// Why two vectors could not be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// One of the vectors has zero Euclidean norm (this includes empty
    /// vectors) or contains a NaN or infinite component.
    #[error("degenerate embedding: vector has zero or non-finite norm")]
    DegenerateVector,
    /// The vectors have different dimensionality.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Accumulates in `f64`.
///
/// # Errors
///
/// - [`SimilarityError::DimensionMismatch`] when lengths differ.
/// - [`SimilarityError::DegenerateVector`] when either norm is exactly zero
///   or not finite.
///
/// ```rust
/// use taskmatch_core::similarity::{cosine_similarity, SimilarityError};
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 1.0]).unwrap();
/// assert!((sim - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
/// assert_eq!(
///     cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]),
///     Err(SimilarityError::DegenerateVector)
/// );
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !usable_norm(norm_a) || !usable_norm(norm_b) {
        return Err(SimilarityError::DegenerateVector);
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    // Rounding can push |sim| a hair past 1.
    Ok(sim.clamp(-1.0, 1.0))
}

/// Squared norm that is neither zero nor NaN/infinite.
fn usable_norm(squared: f64) -> bool {
    squared.is_finite() && squared > 0.0
}
