//! Source definitions and adapter settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A website whose announcements are tracked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory-safe identifier (e.g., "dme_assam")
    pub id: String,

    /// Display name used in timelines
    pub name: String,

    /// Listing page or API endpoint
    pub url: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How to turn the listing into announcements
    pub adapter: AdapterConfig,
}

fn default_enabled() -> bool {
    true
}

/// Adapter selection, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdapterConfig {
    Html(HtmlSelectors),
    JsonApi(JsonApiFields),
}

/// Selectors for an HTML listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSelectors {
    /// CSS selector for listing rows
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// CSS selector for the document link within a row
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// CSS selector for the date cell within a row
    #[serde(default)]
    pub date_selector: Option<String>,

    /// Take every matching link in a row rather than the first
    #[serde(default)]
    pub all_links: bool,

    /// Extra fields to capture: name -> CSS selector within the row
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for HtmlSelectors {
    fn default() -> Self {
        Self {
            row_selector: defaults::row_selector(),
            link_selector: defaults::link_selector(),
            date_selector: None,
            all_links: false,
            extra: BTreeMap::new(),
        }
    }
}

/// Field mapping for a JSON notification API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonApiFields {
    /// JSON pointer to the item array (e.g., "/body/notice")
    #[serde(default)]
    pub items_pointer: String,

    /// Title candidates; the first non-empty one wins
    #[serde(default = "defaults::title_fields")]
    pub title_fields: Vec<String>,

    /// Field holding the document URL
    pub url_field: String,

    #[serde(default)]
    pub date_field: Option<String>,

    /// Field copied into the announcement as `type`
    #[serde(default)]
    pub kind_field: Option<String>,
}

mod defaults {
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn link_selector() -> String {
        r#"a[href*=".pdf"], a[href*=".PDF"]"#.into()
    }
    pub fn title_fields() -> Vec<String> {
        vec!["content".into(), "subject".into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_html_source() {
        let toml_str = r#"
            id = "gmch"
            name = "GMCH"
            url = "https://gmch.gov.in/admissions"

            [adapter]
            kind = "html"
            row_selector = ".table-responsive table tr"
        "#;
        let source: SourceConfig = toml::from_str(toml_str).unwrap();
        assert!(source.enabled);
        match source.adapter {
            AdapterConfig::Html(sel) => {
                assert_eq!(sel.row_selector, ".table-responsive table tr");
                assert!(sel.link_selector.contains(".pdf"));
            }
            other => panic!("unexpected adapter {other:?}"),
        }
    }

    #[test]
    fn test_parse_json_api_source() {
        let toml_str = r#"
            id = "hry"
            name = "Haryana"
            url = "https://api.example.com/v1/api/notifications"
            enabled = false
            adapter = { kind = "json_api", items_pointer = "/body/notice", url_field = "extension", date_field = "publishDate" }
        "#;
        let source: SourceConfig = toml::from_str(toml_str).unwrap();
        assert!(!source.enabled);
        match source.adapter {
            AdapterConfig::JsonApi(fields) => {
                assert_eq!(fields.url_field, "extension");
                assert_eq!(fields.title_fields, vec!["content", "subject"]);
            }
            other => panic!("unexpected adapter {other:?}"),
        }
    }
}
