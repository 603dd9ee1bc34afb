//! Accumulation of per-branch take lists
//!
//! Branch results are merged with [`TakeList::combine`], plain list
//! concatenation. Concatenation is associative with the empty list as
//! identity, so folding outcomes in any grouping gives the same result, and
//! no branch's takes can be lost to completion order. Outcomes are folded in
//! dispatch order so the final list is deterministic.

use super::executor::{BranchOutcome, BranchStatus};
use super::types::Take;
use serde::{Deserialize, Serialize};

/// Ordered collection of takes; the accumulator's value type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeList(Vec<Take>);

impl TakeList {
    pub fn new(takes: Vec<Take>) -> Self {
        Self(takes)
    }

    /// Associative merge: `a` followed by `b`, each keeping its own order
    pub fn combine(a: TakeList, b: TakeList) -> TakeList {
        let mut merged = a.0;
        merged.extend(b.0);
        TakeList(merged)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Take> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Take] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Take> {
        self.0
    }
}

impl From<Vec<Take>> for TakeList {
    fn from(takes: Vec<Take>) -> Self {
        Self(takes)
    }
}

impl FromIterator<TakeList> for TakeList {
    fn from_iter<I: IntoIterator<Item = TakeList>>(iter: I) -> Self {
        iter.into_iter().fold(TakeList::default(), TakeList::combine)
    }
}

impl IntoIterator for TakeList {
    type Item = Take;
    type IntoIter = std::vec::IntoIter<Take>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TakeList {
    type Item = &'a Take;
    type IntoIter = std::slice::Iter<'a, Take>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Summary statistics for the map stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationSummary {
    pub branches: usize,
    pub successful: usize,
    pub failed: usize,
    pub takes: usize,
    /// Sum of branch wall-clock time in seconds
    pub total_duration_secs: f64,
}

impl AggregationSummary {
    pub fn from_outcomes(outcomes: &[BranchOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            branches: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            takes: outcomes.iter().map(|o| o.takes.len()).sum(),
            total_duration_secs: outcomes.iter().map(|o| o.duration.as_secs_f64()).sum(),
        }
    }
}

/// Fold branch outcomes, in dispatch order, into one take list.
///
/// Failed branches contribute nothing.
pub fn accumulate(mut outcomes: Vec<BranchOutcome>) -> (TakeList, AggregationSummary) {
    outcomes.sort_by_key(|o| o.index);
    let summary = AggregationSummary::from_outcomes(&outcomes);

    let takes = outcomes
        .into_iter()
        .map(|outcome| match outcome.status {
            BranchStatus::Success => TakeList::new(outcome.takes),
            BranchStatus::Failed(_) => TakeList::default(),
        })
        .collect();

    (takes, summary)
}
