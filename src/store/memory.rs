//! In-memory store for tests and dry runs.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::EnforcementRecord;
use crate::store::RecordStore;

/// Volatile storage backend with the same upsert semantics as LocalStore.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, EnforcementRecord>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with records, for tests.
    pub fn with_records(records: impl IntoIterator<Item = EnforcementRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.identity_key.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, EnforcementRecord>>> {
        self.records
            .lock()
            .map_err(|_| AppError::store("memory store mutex poisoned"))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, record: &EnforcementRecord) -> Result<()> {
        let mut map = self.lock()?;

        let mut incoming = record.clone();
        if let Some(existing) = map.get(&record.identity_key) {
            incoming.first_seen_run_id = existing.first_seen_run_id.clone();
        }
        map.insert(incoming.identity_key.clone(), incoming);
        Ok(())
    }

    async fn known_keys(&self) -> Result<HashSet<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn load_all(&self) -> Result<Vec<EnforcementRecord>> {
        Ok(self.lock()?.values().cloned().collect())
    }
}
