//! Change-detection pipeline.
//!
//! - `fingerprint`: stable identity for an announcement
//! - `triage` / `classify`: drop irrelevant items, tag round and type
//! - `timeline`: bucket events by round
//! - `reconcile`: select what needs fetching against the ledger
//! - `run`: one pass per source, end to end

pub mod classify;
pub mod fingerprint;
pub mod reconcile;
pub mod run;
pub mod timeline;
pub mod triage;

pub use classify::{Classifier, RuleTable};
pub use fingerprint::{Fingerprint, FingerprintSet, Fingerprinter, SHORT_ID_LEN};
pub use reconcile::{PendingFetch, Reconciler, Reconciliation};
pub use run::{Pipeline, RunOptions, SourceReport};
pub use timeline::TimelineBuilder;
pub use triage::TriageFilter;
