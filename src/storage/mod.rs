//! Storage abstractions for per-source pipeline state.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! └── {source_id}/
//!     ├── hashes.json                   # Fingerprint ledger
//!     ├── timeline.json                 # Latest round timeline
//!     ├── processed_notifications.json  # Latest flat event list
//!     └── metadata.json                 # Saved file names per fingerprint
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Event, RunMetadata, Timeline};
use crate::pipeline::FingerprintSet;

// Re-export for convenience
pub use local::LocalStorage;

/// Ledger file name.
pub const LEDGER_FILE: &str = "hashes.json";
/// Timeline file name.
pub const TIMELINE_FILE: &str = "timeline.json";
/// Flat event list file name.
pub const EVENTS_FILE: &str = "processed_notifications.json";
/// Run metadata file name.
pub const METADATA_FILE: &str = "metadata.json";

/// Durable state for one source.
///
/// Readers never fail: missing or corrupt files read as empty state.
/// Writers report failures and do not retry.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the fingerprint ledger.
    async fn load_ledger(&self) -> FingerprintSet;

    /// Replace the fingerprint ledger.
    async fn save_ledger(&self, fingerprints: &FingerprintSet) -> Result<()>;

    /// Load the previous pass's metadata, if any.
    async fn load_metadata(&self) -> Option<RunMetadata>;

    async fn save_metadata(&self, metadata: &RunMetadata) -> Result<()>;

    async fn save_timeline(&self, timeline: &Timeline) -> Result<()>;

    async fn save_events(&self, events: &[Event]) -> Result<()>;
}
