//! Embedding provider boundary.
//!
//! The analysis core never talks to a model directly. It receives vectors
//! produced by a [`TextEmbedder`], which lets tests inject deterministic
//! fakes and lets the CLI use fastembed.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by an embedding provider.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error(
        "Failed to initialize embedding model '{model}': {reason}\nSuggestion: Ensure you have internet connection for first-time model download"
    )]
    ModelInit { model: String, reason: String },

    #[error(
        "Unknown embedding model '{0}'\nSuggestion: Use one of {models}",
        models = SUPPORTED_MODELS.join(", ")
    )]
    UnknownModel(String),

    #[error(
        "Embedding generation failed: {0}\nSuggestion: Verify the embedding model is properly initialized"
    )]
    EmbeddingFailed(String),

    #[error("Failed to acquire embedding model lock - model may be poisoned")]
    LockPoisoned,
}

/// Model names accepted in `[embedding] model`.
pub const SUPPORTED_MODELS: &[&str] = &[
    "AllMiniLML6V2",
    "AllMiniLML12V2",
    "BGESmallENV15",
    "BGEBaseENV15",
    "NomicEmbedTextV15",
    "MultilingualE5Small",
];

/// Capability that maps text to an embedding vector.
///
/// Implementations must be thread-safe so batch builds can share one
/// embedder across the CLI runtime.
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text, surfacing provider failures.
    fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Name of the model, recorded in the persisted index.
    fn model_name(&self) -> &str;

    /// Embed a single text, degrading to an empty vector on failure.
    ///
    /// An empty vector compares as similarity 0 everywhere, so one failed
    /// call never aborts a batch.
    fn embed(&self, text: &str) -> Vec<f32> {
        match self.try_embed(text) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(model = self.model_name(), "Embedding unavailable: {e}");
                Vec::new()
            }
        }
    }
}

/// Resolve a configured model name to a fastembed model.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    match name {
        "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
        "BGEBaseENV15" => Ok(EmbeddingModel::BGEBaseENV15),
        "NomicEmbedTextV15" => Ok(EmbeddingModel::NomicEmbedTextV15),
        "MultilingualE5Small" => Ok(EmbeddingModel::MultilingualE5Small),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

/// Default directory for downloaded models.
pub fn default_models_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("redundex").join("models"))
        .unwrap_or_else(|| PathBuf::from(".redundex/models"))
}

/// fastembed-backed embedder.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    model_name: String,
}

impl std::fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("model_name", &self.model_name)
            .field("model", &"<TextEmbedding>")
            .finish()
    }
}

impl FastEmbedder {
    /// Load (downloading on first use) the named model.
    pub fn new(
        model_name: &str,
        cache_dir: PathBuf,
        show_progress: bool,
    ) -> Result<Self, EmbeddingError> {
        let model = parse_embedding_model(model_name)?;
        debug!(model = model_name, cache = %cache_dir.display(), "Loading embedding model");

        let text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(show_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit {
            model: model_name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            model: Mutex::new(text_model),
            model_name: model_name.to_string(),
        })
    }
}

impl TextEmbedder for FastEmbedder {
    fn try_embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let embeddings = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::LockPoisoned)?
            .embed(vec![text], None)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("model returned no vector".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
