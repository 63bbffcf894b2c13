//! Local filesystem store.
//!
//! Keeps the full record set in one JSON document keyed by identity.
//! Every write goes to a temp file first and is renamed into place, so a
//! crash mid-write leaves the previous document intact.
//!
//! ## Storage Layout
//!
//! ```text
//! {data_dir}/
//! ├── config.toml           # Watcher configuration
//! └── records.json          # All known records, keyed by identity
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::EnforcementRecord;
use crate::store::RecordStore;

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the full record map, empty if the file doesn't exist yet.
    async fn read_map(&self) -> Result<BTreeMap<String, EnforcementRecord>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the record map atomically (write to temp, then rename).
    async fn write_map(&self, map: &BTreeMap<String, EnforcementRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn upsert(&self, record: &EnforcementRecord) -> Result<()> {
        let mut map = self.read_map().await?;

        let mut incoming = record.clone();
        if let Some(existing) = map.get(&record.identity_key) {
            // Field drift on the source page is refreshed silently; the
            // original sighting stays on record.
            incoming.first_seen_run_id = existing.first_seen_run_id.clone();
        }
        map.insert(incoming.identity_key.clone(), incoming);

        self.write_map(&map).await
    }

    async fn known_keys(&self) -> Result<HashSet<String>> {
        let map = self.read_map().await?;
        Ok(map.into_keys().collect())
    }

    async fn load_all(&self) -> Result<Vec<EnforcementRecord>> {
        let map = self.read_map().await?;
        Ok(map.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_record(key: &str, run_id: &str) -> EnforcementRecord {
        EnforcementRecord {
            identity_key: key.to_string(),
            organisation: format!("Org {key}"),
            date: "2017-12-21".to_string(),
            kind: None,
            penalty_amount: None,
            summary: "summary".to_string(),
            source_url: format!("https://ico.org.uk/{key}/"),
            pdf_url: None,
            first_seen_run_id: run_id.to_string(),
        }
    }

    fn store_in(tmp: &TempDir) -> LocalStore {
        LocalStore::new(tmp.path().join("records.json"))
    }

    #[tokio::test]
    async fn test_empty_store_has_no_keys() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(store.known_keys().await.unwrap().is_empty());
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.upsert(&make_record("a", "run1")).await.unwrap();
        store.upsert(&make_record("b", "run1")).await.unwrap();

        let keys = store.known_keys().await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("a"));
        assert!(keys.contains("b"));
    }

    #[tokio::test]
    async fn test_upsert_preserves_first_seen_run_id() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.upsert(&make_record("a", "run1")).await.unwrap();

        let mut revised = make_record("a", "run2");
        revised.summary = "revised text".to_string();
        store.upsert(&revised).await.unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].first_seen_run_id, "run1");
        assert_eq!(records[0].summary, "revised text");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);

        store.upsert(&make_record("a", "run1")).await.unwrap();

        assert!(tmp.path().join("records.json").exists());
        assert!(!tmp.path().join("records.tmp").exists());
    }

    #[tokio::test]
    async fn test_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path().join("nested/dir/records.json"));

        store.upsert(&make_record("a", "run1")).await.unwrap();
        assert_eq!(store.known_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("records.json");

        LocalStore::new(&path)
            .upsert(&make_record("a", "run1"))
            .await
            .unwrap();

        let reopened = LocalStore::new(&path);
        assert!(reopened.known_keys().await.unwrap().contains("a"));
    }
}
