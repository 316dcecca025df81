//! Local filesystem storage implementation.
//!
//! Every write goes to a temporary sibling file first and is renamed into
//! place, so readers see either the old or the new document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Event, RunMetadata, Timeline};
use crate::pipeline::{Fingerprint, FingerprintSet};
use crate::storage::{EVENTS_FILE, LEDGER_FILE, METADATA_FILE, StateStore, TIMELINE_FILE};

/// Local filesystem storage backend rooted at one source's data directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data, reporting failures against the target path.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes)
            .await
            .map_err(|e| AppError::persistence(&self.path(key), e))
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read JSON data, treating unreadable or malformed files as absent.
    async fn read_json_lenient<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.read_json(key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable {}: {}",
                    self.path(key).display(),
                    e
                );
                None
            }
        }
    }

    /// Number of regular files in a directory (0 if it does not exist).
    pub async fn count_files(dir: &Path) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return 0;
        };
        let mut count = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                count += 1;
            }
        }
        count
    }
}

#[async_trait]
impl StateStore for LocalStorage {
    async fn load_ledger(&self) -> FingerprintSet {
        self.read_json_lenient::<FingerprintSet>(LEDGER_FILE)
            .await
            .unwrap_or_default()
    }

    async fn save_ledger(&self, fingerprints: &FingerprintSet) -> Result<()> {
        let mut sorted: Vec<&Fingerprint> = fingerprints.iter().collect();
        sorted.sort(); // Deterministic output
        self.write_json(LEDGER_FILE, &sorted).await
    }

    async fn load_metadata(&self) -> Option<RunMetadata> {
        self.read_json_lenient(METADATA_FILE).await
    }

    async fn save_metadata(&self, metadata: &RunMetadata) -> Result<()> {
        self.write_json(METADATA_FILE, metadata).await
    }

    async fn save_timeline(&self, timeline: &Timeline) -> Result<()> {
        self.write_json(TIMELINE_FILE, timeline).await
    }

    async fn save_events(&self, events: &[Event]) -> Result<()> {
        self.write_json(EVENTS_FILE, events).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataEntry, RoundTag};
    use crate::pipeline::Fingerprinter;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!storage.path("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_ledger_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("gmch"));
        let fp = Fingerprinter::default();
        let set: FingerprintSet = ["a", "b", "c"]
            .iter()
            .map(|t| fp.fingerprint("https://example.com/x.pdf", t))
            .collect();

        storage.save_ledger(&set).await.unwrap();
        assert_eq!(storage.load_ledger().await, set);

        let raw: Vec<String> =
            serde_json::from_slice(&std::fs::read(storage.path(LEDGER_FILE)).unwrap()).unwrap();
        assert_eq!(raw.len(), 3);
        assert!(raw.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_missing_ledger_is_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.load_ledger().await.is_empty());
        assert!(storage.load_metadata().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(storage.path(LEDGER_FILE), b"{not json").unwrap();
        std::fs::write(storage.path(METADATA_FILE), b"[1, 2").unwrap();

        assert!(storage.load_ledger().await.is_empty());
        assert!(storage.load_metadata().await.is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        // A file where the source directory should be
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"").unwrap();
        let storage = LocalStorage::new(&blocker);

        let err = storage.save_ledger(&FingerprintSet::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_timeline_and_metadata_files() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.save_timeline(&Timeline::new("GMCH")).await.unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(storage.path(TIMELINE_FILE)).unwrap()).unwrap();
        assert!(json["rounds"][RoundTag::SpecialStray.as_str()]["events"].is_array());

        let metadata = RunMetadata {
            announcements: vec![MetadataEntry {
                title: "Round 1".into(),
                url: "https://x/1.pdf".into(),
                date: "2025-07-01".into(),
                hash: "ab".into(),
                saved_as: "2025-07-01_Round_1.pdf".into(),
            }],
            ..RunMetadata::default()
        };
        storage.save_metadata(&metadata).await.unwrap();
        let loaded = storage.load_metadata().await.unwrap();
        assert_eq!(loaded.recovery_index()["ab"], "2025-07-01_Round_1.pdf");
    }

    #[tokio::test]
    async fn test_count_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"").unwrap();
        std::fs::write(tmp.path().join("b.pdf"), b"").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();

        assert_eq!(LocalStorage::count_files(tmp.path()).await, 2);
        assert_eq!(LocalStorage::count_files(&tmp.path().join("none")).await, 0);
    }
}
