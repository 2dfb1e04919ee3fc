//! Threshold-filtered pairwise matching with once-claimed exclusivity.
//!
//! A single pass walks the store in load order. The first unclaimed record
//! becomes an anchor, and every later unclaimed record scoring at or above
//! the threshold joins its group and is claimed on the spot. An anchor that
//! gathered members is claimed as well. Claimed identifiers are never
//! compared again in the same pass, so the output is a partition rather than
//! a similarity graph: transitively similar triples may land in different
//! groups depending on store order. For a fixed order the result is fully
//! deterministic.
//!
//! Pairs from the same location whose names share a leading segment are
//! skipped as likely overloads of one symbol.

use crate::storage::EmbeddingStore;
use crate::vector::cosine_similarity;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// One reported pair: `target` matched into the group anchored by `source`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub source: String,
    pub target: String,
    pub score: f32,
}

/// A member claimed into a redundancy group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    pub id: String,
    pub score: f32,
}

/// An anchor and the members it claimed, in discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedundancyGroup {
    pub anchor: String,
    pub members: Vec<GroupMember>,
}

impl RedundancyGroup {
    /// Members ordered by descending score; ties keep discovery order.
    pub fn sorted_by_score(mut self) -> Self {
        self.members.sort_by(|a, b| b.score.total_cmp(&a.score));
        self
    }

    pub fn best_score(&self) -> Option<f32> {
        self.members.iter().map(|m| m.score).reduce(f32::max)
    }
}

/// Result of one grouping pass: anchors in discovery order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MatchSet {
    threshold: f32,
    groups: Vec<RedundancyGroup>,
}

impl MatchSet {
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn groups(&self) -> &[RedundancyGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<RedundancyGroup> {
        self.groups
    }

    /// Members of the group anchored at `anchor`, if any.
    pub fn get(&self, anchor: &str) -> Option<&[GroupMember]> {
        self.groups
            .iter()
            .find(|g| g.anchor == anchor)
            .map(|g| g.members.as_slice())
    }

    pub fn contains_anchor(&self, anchor: &str) -> bool {
        self.groups.iter().any(|g| g.anchor == anchor)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Flatten into `(anchor, member, score)` pairs.
    pub fn matches(&self) -> impl Iterator<Item = SimilarityMatch> + '_ {
        self.groups.iter().flat_map(|group| {
            group.members.iter().map(|member| SimilarityMatch {
                source: group.anchor.clone(),
                target: member.id.clone(),
                score: member.score,
            })
        })
    }
}

/// Partition the store into redundancy groups at `threshold`.
///
/// Scores for one anchor row are computed in parallel; claims are resolved
/// sequentially in store order, so the result equals a sequential pass.
pub fn find_matches(store: &EmbeddingStore, threshold: f32) -> MatchSet {
    let records = store.all();
    let ids: Vec<String> = records.iter().map(|r| r.id()).collect();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();
    let mut comparisons = 0usize;

    for (i, anchor) in records.iter().enumerate() {
        if claimed.contains(ids[i].as_str()) {
            continue;
        }

        let candidates: Vec<(usize, f32)> = (i + 1..records.len())
            .into_par_iter()
            .filter(|&j| !claimed.contains(ids[j].as_str()))
            .filter(|&j| !anchor.is_likely_overload_of(&records[j]))
            .map(|j| (j, cosine_similarity(&anchor.embedding, &records[j].embedding)))
            .collect();
        comparisons += candidates.len();

        let mut members = Vec::new();
        for (j, score) in candidates {
            // A duplicate identifier may have been claimed earlier in this row
            if score >= threshold && claimed.insert(ids[j].as_str()) {
                members.push(GroupMember {
                    id: ids[j].clone(),
                    score,
                });
            }
        }

        if !members.is_empty() {
            claimed.insert(ids[i].as_str());
            groups.push(RedundancyGroup {
                anchor: ids[i].clone(),
                members,
            });
        }
    }

    debug!(
        threshold,
        records = records.len(),
        comparisons,
        groups = groups.len(),
        "Grouping pass complete"
    );

    MatchSet { threshold, groups }
}
