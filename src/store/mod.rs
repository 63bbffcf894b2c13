//! Durable record storage.
//!
//! The coordinator relies on `upsert` returning `Ok` only once the identity
//! key is durably committed: persist happens strictly before notify, so a
//! crash-and-retry must find the key and stay quiet.

pub mod local;
pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::EnforcementRecord;

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert the record, or refresh its fields if the key already exists.
    ///
    /// An existing `first_seen_run_id` is never overwritten. Each call is
    /// atomic: a crash mid-write must not leave a half-written record
    /// observable on the next read.
    async fn upsert(&self, record: &EnforcementRecord) -> Result<()>;

    /// All identity keys currently present.
    async fn known_keys(&self) -> Result<HashSet<String>>;

    /// Load every stored record, for operator inspection.
    async fn load_all(&self) -> Result<Vec<EnforcementRecord>>;
}
