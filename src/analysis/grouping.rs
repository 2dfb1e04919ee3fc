//! Two-severity redundancy classification.

use crate::analysis::similarity::{RedundancyGroup, find_matches};
use crate::storage::EmbeddingStore;
use crate::{IndexError, IndexResult};
use serde::Serialize;

/// Default cutoff for likely duplicates.
pub const DEFAULT_CRITICAL_THRESHOLD: f32 = 0.90;

/// Default cutoff for merge candidates.
pub const DEFAULT_POTENTIAL_THRESHOLD: f32 = 0.85;

/// Severity cutoffs for [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub critical: f32,
    pub potential: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical: DEFAULT_CRITICAL_THRESHOLD,
            potential: DEFAULT_POTENTIAL_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Validated thresholds: both in `[-1, 1]`, potential not above critical.
    pub fn new(critical: f32, potential: f32) -> IndexResult<Self> {
        validate_threshold(critical)?;
        validate_threshold(potential)?;
        if potential > critical {
            return Err(IndexError::InvalidThreshold {
                value: potential,
                reason: "potential threshold is above the critical threshold",
            });
        }
        Ok(Self {
            critical,
            potential,
        })
    }
}

/// Reject NaN and values outside the cosine range.
pub fn validate_threshold(value: f32) -> IndexResult<f32> {
    if value.is_nan() || !(-1.0..=1.0).contains(&value) {
        return Err(IndexError::InvalidThreshold {
            value,
            reason: "threshold must be a number between -1.0 and 1.0",
        });
    }
    Ok(value)
}

/// Critical and potential groups from one classification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedundancyReport {
    pub thresholds: Thresholds,
    /// Groups at or above the critical threshold
    pub critical: Vec<RedundancyGroup>,
    /// Groups at the potential threshold whose anchor is not a critical anchor
    pub potential: Vec<RedundancyGroup>,
}

impl RedundancyReport {
    pub fn is_empty(&self) -> bool {
        self.critical.is_empty() && self.potential.is_empty()
    }

    pub fn total_groups(&self) -> usize {
        self.critical.len() + self.potential.len()
    }
}

/// Run the critical and potential passes and drop double-reported anchors.
///
/// The two passes are independent partitions; only anchors are compared
/// across them. Members of every reported group are sorted by descending
/// score for display.
pub fn classify(store: &EmbeddingStore, thresholds: Thresholds) -> RedundancyReport {
    let (critical, potential) = rayon::join(
        || find_matches(store, thresholds.critical),
        || find_matches(store, thresholds.potential),
    );

    let potential = potential
        .into_groups()
        .into_iter()
        .filter(|group| !critical.contains_anchor(&group.anchor))
        .map(RedundancyGroup::sorted_by_score)
        .collect();

    let critical = critical
        .into_groups()
        .into_iter()
        .map(RedundancyGroup::sorted_by_score)
        .collect();

    RedundancyReport {
        thresholds,
        critical,
        potential,
    }
}
