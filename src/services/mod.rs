//! Service layer for talking to the outside world.
//!
//! - Source adapters (`HtmlListAdapter`, `JsonApiAdapter`)
//! - Artifact fetching (`HttpFetcher`, `download_all`)

mod adapters;
mod fetcher;

pub use adapters::{HtmlListAdapter, JsonApiAdapter, SourceAdapter, adapter_for};
pub use fetcher::{ArtifactFetcher, DownloadReport, HttpFetcher, artifact_filename, download_all};
