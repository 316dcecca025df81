//! Raw announcement data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A candidate document reference produced by a source adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Announcement title as shown on the source page
    pub title: String,

    /// Absolute URL of the document
    pub url: String,

    /// Publication date in whatever form the source provides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// When the adapter scraped this record
    pub scraped_date: DateTime<Utc>,

    /// Adapter-specific fields (file size, subject, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Announcement {
    /// Create an announcement scraped now.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: None,
            scraped_date: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Set the publication date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Attach an adapter-specific field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Publication date, or the scrape timestamp when the source gave none.
    pub fn effective_date(&self) -> String {
        match self.date.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => date.to_string(),
            _ => self.scraped_date.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_date_prefers_source_date() {
        let ann = Announcement::new("Round 1 Schedule", "https://example.com/a.pdf")
            .with_date("2025-07-14");
        assert_eq!(ann.effective_date(), "2025-07-14");
    }

    #[test]
    fn test_effective_date_falls_back_on_blank() {
        let ann = Announcement::new("Round 1 Schedule", "https://example.com/a.pdf").with_date("  ");
        assert_eq!(ann.effective_date(), ann.scraped_date.to_rfc3339());
    }

    #[test]
    fn test_extra_fields_flatten() {
        let ann = Announcement::new("Notice", "https://example.com/n.pdf")
            .with_extra("fileSize", "1.2 MB");
        let json = serde_json::to_value(&ann).unwrap();
        assert_eq!(json["fileSize"], "1.2 MB");
        assert!(json.get("date").is_none());
        assert!(json.get("scrapedDate").is_some());

        let back: Announcement = serde_json::from_value(json).unwrap();
        assert_eq!(back, ann);
    }
}
