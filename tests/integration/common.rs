//! Shared fixtures for integration tests.

use redundex::{EmbeddingError, TextEmbedder};

/// Deterministic embedder: one axis per keyword, counted in the text.
///
/// Text without any keyword falls on a shared "noise" axis so nothing is a
/// zero vector.
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
        }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut v: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lowered.matches(k).count() as f32)
            .collect();
        let noise = if v.iter().all(|x| *x == 0.0) { 1.0 } else { 0.0 };
        v.push(noise);
        v
    }
}

impl TextEmbedder for KeywordEmbedder {
    fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector(text))
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}
