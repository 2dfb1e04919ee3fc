//! Ad-hoc ranking and exhaustive duplicate pairing.
//!
//! Unlike [`find_matches`](crate::analysis::find_matches), nothing here
//! claims identifiers: ranking is total over the store and duplicate pairing
//! reports every qualifying pair independently.

use crate::storage::{ArtifactRecord, EmbeddingStore};
use crate::vector::cosine_similarity;
use rayon::prelude::*;
use serde::Serialize;

/// A stored artifact scored against a query vector.
#[derive(Debug, Clone, Copy)]
pub struct RankedArtifact<'a> {
    pub record: &'a ArtifactRecord,
    pub score: f32,
}

impl RankedArtifact<'_> {
    pub fn id(&self) -> String {
        self.record.id()
    }

    pub fn preview(&self) -> &str {
        &self.record.preview
    }
}

/// Two artifacts whose similarity reached the duplicate threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicatePair {
    pub first: String,
    pub second: String,
    pub score: f32,
}

/// Rank every record against `query` and keep the best `top_n`.
///
/// Sorting is stable, so equal scores keep store order. No minimum score is
/// applied: low-similarity records fill the list when `top_n` allows.
pub fn rank<'a>(store: &'a EmbeddingStore, query: &[f32], top_n: usize) -> Vec<RankedArtifact<'a>> {
    let mut ranked: Vec<RankedArtifact<'a>> = store
        .all()
        .par_iter()
        .map(|record| RankedArtifact {
            record,
            score: cosine_similarity(query, &record.embedding),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(top_n);
    ranked
}

/// Every unordered pair scoring at or above `threshold`, best first.
///
/// Pairs with equal scores keep their `(i, j)` store order.
pub fn find_all_pairs_duplicates(store: &EmbeddingStore, threshold: f32) -> Vec<DuplicatePair> {
    let records = store.all();
    let ids: Vec<String> = records.iter().map(|r| r.id()).collect();

    let mut pairs: Vec<DuplicatePair> = (0..records.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let ids = &ids;
            (i + 1..records.len()).filter_map(move |j| {
                let score = cosine_similarity(&records[i].embedding, &records[j].embedding);
                (score >= threshold).then(|| DuplicatePair {
                    first: ids[i].clone(),
                    second: ids[j].clone(),
                    score,
                })
            })
        })
        .collect();

    pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
    pairs
}
