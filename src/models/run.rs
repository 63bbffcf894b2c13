//! Run lifecycle data structures.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// States of a single pipeline run.
///
/// A run walks `Fetching → Normalizing → Diffing → Persisting → Notifying
/// → Done`; `Failed` is terminal and reachable from any non-Done state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Fetching,
    Normalizing,
    Diffing,
    Persisting,
    Notifying,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Fetching => "FETCHING",
            RunState::Normalizing => "NORMALIZING",
            RunState::Diffing => "DIFFING",
            RunState::Persisting => "PERSISTING",
            RunState::Notifying => "NOTIFYING",
            RunState::Done => "DONE",
            RunState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyOutcome {
    Sent,
    Failed(String),
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent)
    }
}

/// Summary of one completed run, discarded after logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Timestamp-derived run identifier
    pub run_id: String,

    /// Terminal state of the run
    pub state: RunState,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Raw candidates produced by the source adapter
    pub fetched: usize,

    /// Candidates dropped by the normalizer
    pub malformed: usize,

    /// Candidates absent from the store at the start of the run
    pub new_records: usize,

    /// Candidates already known (including duplicates within the run)
    pub known_records: usize,

    /// Per-record notification outcomes, new records only
    pub outcomes: Vec<(String, NotifyOutcome)>,
}

impl RunSummary {
    /// Number of notifications that went out.
    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_sent()).count()
    }

    /// Identity keys that were stored but whose notification failed.
    pub fn delivery_gaps(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_sent())
            .map(|(key, _)| key.as_str())
            .collect()
    }
}
