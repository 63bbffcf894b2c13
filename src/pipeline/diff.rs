// src/pipeline/diff.rs

//! Diff calculation for change detection.
//!
//! Partitions the current run's candidates into new and known against the
//! set of identity keys already present in the durable store. Deterministic,
//! read-only over the store's key set.

use std::collections::HashSet;

use crate::models::EnforcementRecord;

/// Result of partitioning one run's candidates.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Records absent from the store, in source order
    pub new: Vec<EnforcementRecord>,
    /// Records already known, including repeats within this run
    pub known: Vec<EnforcementRecord>,
}

impl DiffResult {
    /// Check if the run discovered anything new.
    pub fn has_new(&self) -> bool {
        !self.new.is_empty()
    }

    /// Total candidates partitioned.
    pub fn total(&self) -> usize {
        self.new.len() + self.known.len()
    }
}

/// Partition candidates against the store's known keys.
///
/// A key repeated within one batch counts as new only at its first
/// occurrence; later occurrences are known-within-run, so a duplicated
/// source row cannot trigger a second notification.
pub fn partition(candidates: Vec<EnforcementRecord>, known_keys: &HashSet<String>) -> DiffResult {
    let mut seen_this_run: HashSet<String> = HashSet::new();
    let mut result = DiffResult::default();

    for record in candidates {
        let fresh = !known_keys.contains(&record.identity_key)
            && seen_this_run.insert(record.identity_key.clone());
        if fresh {
            result.new.push(record);
        } else {
            result.known.push(record);
        }
    }
    result
}
