//! Redundancy detection over an embedding store.
//!
//! Every pass reads the store without mutating it. Parallel sections never
//! change results: claims and sort orders are resolved in store order.

pub mod grouping;
pub mod names;
pub mod query;
pub mod similarity;

pub use grouping::{
    DEFAULT_CRITICAL_THRESHOLD, DEFAULT_POTENTIAL_THRESHOLD, RedundancyReport, Thresholds,
    classify, validate_threshold,
};
pub use names::{
    DEFAULT_DISPLAY_CAP, DEFAULT_MIN_MEMBERS, NameGroup, NameGroupReport, VERB_PREFIXES,
    base_name, group_by_base_name, qualified_symbols, symbol_name,
};
pub use query::{DuplicatePair, RankedArtifact, find_all_pairs_duplicates, rank};
pub use similarity::{GroupMember, MatchSet, RedundancyGroup, SimilarityMatch, find_matches};
