/// The main library module for redundex
pub mod analysis;
pub mod config;
pub mod display;
pub mod error;
pub mod indexing;
pub mod io;
pub mod storage;
pub mod vector;

// Explicit exports for better API clarity
pub use analysis::{
    DuplicatePair, MatchSet, NameGroup, NameGroupReport, RankedArtifact, RedundancyGroup,
    RedundancyReport, SimilarityMatch, Thresholds, classify, find_all_pairs_duplicates,
    find_matches, group_by_base_name, rank,
};
pub use config::Settings;
pub use error::{IndexError, IndexResult};
pub use indexing::{BuildSummary, IndexBuilder, SaveTarget};
pub use storage::{ArtifactRecord, EmbeddingStore, IndexPersistence};
pub use vector::{EmbeddingError, FastEmbedder, TextEmbedder, cosine_similarity};
