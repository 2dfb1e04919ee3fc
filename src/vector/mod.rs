//! Vector primitives and the embedding provider boundary.
//!
//! `math` holds the pure comparison functions used by every analysis pass;
//! `embedding` defines the [`TextEmbedder`] capability and its fastembed
//! implementation.

mod embedding;
mod math;

pub use embedding::{
    EmbeddingError, FastEmbedder, SUPPORTED_MODELS, TextEmbedder, default_models_dir,
    parse_embedding_model,
};
pub use math::{cosine_similarity, dot, magnitude};
