//! Reconciliation of the current events against the fingerprint ledger.
//!
//! An event is fetched when its fingerprint is not in the ledger, or when the
//! ledger has it but the artifact recorded for it in run metadata is no
//! longer on disk.

use std::collections::HashMap;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::models::{Event, ReconcileCounts};

use super::fingerprint::{Fingerprint, FingerprintSet, Fingerprinter};

/// An event selected for download, annotated with its fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingFetch {
    #[serde(flatten)]
    pub event: Event,
    pub hash: Fingerprint,
    /// Seen before, but its artifact was missing
    #[serde(default)]
    pub recovered: bool,
}

/// Output of a reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Events to fetch, in input order
    pub to_fetch: Vec<PendingFetch>,
    /// Prior ledger plus every fingerprint of this pass
    pub fingerprints: FingerprintSet,
    pub counts: ReconcileCounts,
}

/// Compares events with a prior ledger and the artifact store.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    fingerprinter: &'a Fingerprinter,
}

impl<'a> Reconciler<'a> {
    pub fn new(fingerprinter: &'a Fingerprinter) -> Self {
        Self { fingerprinter }
    }

    /// Select the events that need a fresh fetch.
    ///
    /// The recovery check only runs when both `artifact_dir` and an entry in
    /// `recovery` exist for a previously seen fingerprint.
    pub fn reconcile(
        &self,
        events: &[Event],
        prior: &FingerprintSet,
        artifact_dir: Option<&Path>,
        recovery: Option<&HashMap<String, String>>,
    ) -> Reconciliation {
        let mut fingerprints = prior.clone();
        let mut to_fetch = Vec::new();
        let mut recovered = 0usize;

        for event in events {
            let hash = self.fingerprinter.of_event(event);
            fingerprints.insert(hash.clone());

            let seen = prior.contains(&hash);
            let missing = seen && Self::artifact_missing(&hash, artifact_dir, recovery);

            if missing {
                recovered += 1;
            }

            if !seen || missing {
                to_fetch.push(PendingFetch {
                    event: event.clone(),
                    hash,
                    recovered: missing,
                });
            }
        }

        let counts = ReconcileCounts {
            total_scraped: events.len(),
            total_previous: prior.len(),
            total_new: to_fetch.len(),
            recovered,
        };

        Reconciliation {
            to_fetch,
            fingerprints,
            counts,
        }
    }

    fn artifact_missing(
        hash: &Fingerprint,
        artifact_dir: Option<&Path>,
        recovery: Option<&HashMap<String, String>>,
    ) -> bool {
        let (Some(dir), Some(recovery)) = (artifact_dir, recovery) else {
            return false;
        };
        let Some(saved_as) = recovery.get(hash.as_str()) else {
            return false;
        };
        if !is_plain_file_name(saved_as) {
            log::warn!(
                "Ignoring recorded file name outside the artifact directory: {}",
                saved_as
            );
            return false;
        }

        if dir.join(saved_as).exists() {
            false
        } else {
            log::info!(
                "Hash exists but file is missing: {}. Marking for re-download.",
                saved_as
            );
            true
        }
    }
}

/// A single normal path component, with no separators, root or `..`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
