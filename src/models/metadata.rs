//! Per-source run metadata (`metadata.json`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counts produced by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileCounts {
    /// Events considered
    pub total_scraped: usize,
    /// Size of the ledger before this pass
    pub total_previous: usize,
    /// Events marked for fetch
    pub total_new: usize,
    /// Of those, previously seen events whose artifact went missing
    pub recovered: usize,
}

/// Outcome of a download batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStats {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Statistics block of `metadata.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    #[serde(default)]
    pub reconcile: ReconcileCounts,
    #[serde(default)]
    pub downloads: DownloadStats,
}

/// Where an artifact was saved for a fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub date: String,
    /// Full fingerprint
    #[serde(default)]
    pub hash: String,
    /// File name under the source's download directory
    #[serde(default)]
    pub saved_as: String,
}

/// Persisted record of the latest pass for a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub total_announcements: usize,
    #[serde(default)]
    pub statistics: RunStatistics,
    #[serde(default)]
    pub announcements: Vec<MetadataEntry>,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            total_announcements: 0,
            statistics: RunStatistics::default(),
            announcements: Vec::new(),
        }
    }
}

impl RunMetadata {
    /// Fingerprint to saved file name, for the missing-artifact check.
    ///
    /// Entries lacking either field are ignored.
    pub fn recovery_index(&self) -> HashMap<String, String> {
        self.announcements
            .iter()
            .filter(|e| !e.hash.is_empty() && !e.saved_as.is_empty())
            .map(|e| (e.hash.clone(), e.saved_as.clone()))
            .collect()
    }

    /// Build the next pass's metadata from this one.
    ///
    /// Entries are keyed by hash; the new entries replace older ones and
    /// keep their position at the end.
    pub fn merged(
        &self,
        entries: Vec<MetadataEntry>,
        total_announcements: usize,
        statistics: RunStatistics,
    ) -> RunMetadata {
        let mut announcements: Vec<MetadataEntry> = self
            .announcements
            .iter()
            .filter(|old| !entries.iter().any(|new| new.hash == old.hash))
            .cloned()
            .collect();
        announcements.extend(entries);

        RunMetadata {
            last_updated: Utc::now(),
            total_announcements,
            statistics,
            announcements,
        }
    }
}
