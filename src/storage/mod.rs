//! Embedding store and its persisted JSON index.

mod persistence;
mod record;
mod store;

pub use persistence::{DEFAULT_PREVIEW_CHARS, IndexPersistence};
pub use record::{
    ArtifactRecord, IDENTIFIER_SEPARATOR, leading_segment, split_identifier, truncate_chars,
};
pub use store::EmbeddingStore;
