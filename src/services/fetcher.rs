// src/services/fetcher.rs

//! Artifact fetching.
//!
//! Downloads the documents behind newly detected events into a source's
//! download directory.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{DownloadStats, MetadataEntry};
use crate::pipeline::PendingFetch;
use crate::utils::sanitize_filename;

/// Retrieves one artifact to a destination path.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP implementation backed by a shared client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;
        let bytes = response.bytes().await.map_err(|e| AppError::fetch(url, e))?;

        write_artifact(dest, &bytes).await
    }
}

/// Write through a `.part` sibling so partial downloads never take the
/// final name. The temporary file is removed if either step fails.
async fn write_artifact(dest: &Path, bytes: &[u8]) -> Result<()> {
    let part = dest.with_extension("part");
    let result = match tokio::fs::write(&part, bytes).await {
        Ok(()) => tokio::fs::rename(&part, dest).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(AppError::Io(e));
    }
    Ok(())
}

/// File name for an artifact fetched on `day`.
pub fn artifact_filename(title: &str, day: NaiveDate) -> String {
    format!("{}_{}.pdf", day.format("%Y-%m-%d"), sanitize_filename(title))
}

/// Result of a download batch.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub stats: DownloadStats,
    /// One entry per pending item, in order
    pub entries: Vec<MetadataEntry>,
}

/// Fetch every pending item into `dir`, one at a time.
///
/// Existing files are skipped. A failed fetch is counted and the batch
/// continues; its entry is still recorded so the next pass sees the file as
/// missing.
pub async fn download_all(
    fetcher: &dyn ArtifactFetcher,
    pending: &[PendingFetch],
    dir: &Path,
    delay: Duration,
    day: NaiveDate,
) -> Result<DownloadReport> {
    let mut report = DownloadReport {
        stats: DownloadStats {
            total: pending.len(),
            ..DownloadStats::default()
        },
        entries: Vec::with_capacity(pending.len()),
    };
    if pending.is_empty() {
        return Ok(report);
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::persistence(dir, e))?;

    for (i, item) in pending.iter().enumerate() {
        let filename = artifact_filename(&item.event.title, day);
        let dest = dir.join(&filename);

        log::info!("[{}/{}] {}", i + 1, pending.len(), item.event.title);

        report.entries.push(MetadataEntry {
            title: item.event.title.clone(),
            url: item.event.url.clone(),
            date: item.event.date.clone(),
            hash: item.hash.to_string(),
            saved_as: filename.clone(),
        });

        if dest.exists() {
            log::info!("  Already exists: {}", filename);
            report.stats.skipped += 1;
            continue;
        }

        match fetcher.fetch(&item.event.url, &dest).await {
            Ok(()) => {
                log::info!("  Downloaded: {}", filename);
                report.stats.downloaded += 1;
            }
            Err(e) => {
                log::warn!("  Failed to download {}: {}", item.event.url, e);
                report.stats.failed += 1;
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    Ok(report)
}
