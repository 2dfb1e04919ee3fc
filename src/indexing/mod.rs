//! Source discovery and batch embedding.

pub mod builder;
pub mod walker;

pub use builder::{BuildSummary, IndexBuilder, SaveTarget, SourceChunk, SourceChunks};
pub use walker::FileWalker;
