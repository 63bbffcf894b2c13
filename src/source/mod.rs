//! Source adapter boundary.
//!
//! The watcher treats the regulator's website as an opaque upstream: a
//! source produces one ordered batch of raw candidates per call, and the
//! normalizer is the sole translation boundary into typed records.

pub mod ico;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawRecord;

// Re-export for convenience
pub use ico::IcoSource;

/// A source of raw enforcement action candidates.
#[async_trait]
pub trait EnforcementSource: Send + Sync {
    /// Fetch the full ordered batch the source currently lists.
    ///
    /// A transport error here is fatal to the run; partial batches are
    /// never returned.
    async fn fetch_candidates(&self) -> Result<Vec<RawRecord>>;
}
