//! Numeric primitives for comparing embedding vectors.
//!
//! Every degenerate input resolves to a defined value instead of an error:
//! similarity is used for best-effort ranking, not validation.

use tracing::debug;

/// Dot product over the common prefix of two vectors.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean length of a vector.
#[must_use]
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity between two embeddings.
///
/// Returns `0.0` when either vector is empty (embedding unavailable), when
/// the lengths differ (dimension mismatch), when either magnitude is zero,
/// or when the inputs produce a non-finite value. Otherwise the result is
/// nominally in `[-1.0, 1.0]`.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() != b.len() {
        debug!(
            left = a.len(),
            right = b.len(),
            "Dimension mismatch between embeddings, treating similarity as 0"
        );
        return 0.0;
    }

    let magnitude_a = magnitude(a);
    let magnitude_b = magnitude(b);

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    let similarity = dot(a, b) / (magnitude_a * magnitude_b);
    if similarity.is_finite() {
        // Adding +0.0 folds -0.0 into +0.0 so score ordering stays stable
        similarity + 0.0
    } else {
        0.0
    }
}
