//! Stable announcement identity.
//!
//! A fingerprint is the SHA-256 of `canonical_url + separator + title`,
//! hex encoded. Signed object-storage URLs carry short-lived query tokens, so
//! for those the query and fragment are dropped before hashing; every other
//! URL is hashed exactly as scraped.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::models::{Announcement, Event, FingerprintConfig};
use crate::utils::url::{has_query_param, strip_query};

/// Length of the display id derived from a fingerprint.
pub const SHORT_ID_LEN: usize = 16;

/// Lowercase hex SHA-256 digest identifying one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display id used for `Event::id`.
    pub fn short(&self) -> &str {
        &self.0[..SHORT_ID_LEN.min(self.0.len())]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

/// Every fingerprint seen for a source.
pub type FingerprintSet = HashSet<Fingerprint>;

/// Computes fingerprints under a set of canonicalization rules.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    volatile_hosts: Vec<String>,
    signature_params: Vec<String>,
    separator: String,
}

impl Fingerprinter {
    pub fn new(config: &FingerprintConfig) -> Self {
        Self {
            volatile_hosts: config
                .volatile_hosts
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
            signature_params: config.signature_params.clone(),
            separator: config.separator.clone(),
        }
    }

    /// The URL form that goes into the digest.
    ///
    /// Unparseable URLs are returned unchanged.
    pub fn canonical_url(&self, raw: &str) -> String {
        match Url::parse(raw) {
            Ok(url) if self.is_volatile(&url) => strip_query(&url),
            _ => raw.to_string(),
        }
    }

    fn is_volatile(&self, url: &Url) -> bool {
        let host_match = url.host_str().is_some_and(|host| {
            let host = host.to_lowercase();
            self.volatile_hosts.iter().any(|v| host.contains(v.as_str()))
        });
        host_match || has_query_param(url, &self.signature_params)
    }

    /// Fingerprint a `(url, title)` pair.
    pub fn fingerprint(&self, url: &str, title: &str) -> Fingerprint {
        let data = format!("{}{}{}", self.canonical_url(url), self.separator, title);
        let digest = Sha256::digest(data.as_bytes());
        Fingerprint(hex::encode(digest))
    }

    pub fn of_announcement(&self, announcement: &Announcement) -> Fingerprint {
        self.fingerprint(&announcement.url, &announcement.title)
    }

    pub fn of_event(&self, event: &Event) -> Fingerprint {
        self.fingerprint(&event.url, &event.title)
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new(&FingerprintConfig::default())
    }
}
