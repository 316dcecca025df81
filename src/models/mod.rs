// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod announcement;
mod config;
mod event;
mod metadata;
mod source;
mod timeline;

// Re-export all public types
pub use announcement::Announcement;
pub use config::{
    ClassifierConfig, Config, CrawlerConfig, FingerprintConfig, PathsConfig, RuleConfig,
    TriageConfig,
};
pub use event::{Classification, DocTag, Event, RoundTag};
pub use metadata::{DownloadStats, MetadataEntry, ReconcileCounts, RunMetadata, RunStatistics};
pub use source::{AdapterConfig, HtmlSelectors, JsonApiFields, SourceConfig};
pub use timeline::{RoundBucket, Timeline};
