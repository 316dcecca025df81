// src/services/adapters.rs

//! Source adapters.
//!
//! Turn a listing page or notification API into raw announcements.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{AdapterConfig, Announcement, HtmlSelectors, JsonApiFields};
use crate::utils::http::fetch_text;
use crate::utils::normalize_whitespace;
use crate::utils::url::resolve;

/// Produces announcements for a source URL.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, client: &Client, url: &str) -> Result<Vec<Announcement>>;

    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;
}

/// Build the adapter configured for a source.
pub fn adapter_for(config: &AdapterConfig) -> Box<dyn SourceAdapter> {
    match config {
        AdapterConfig::Html(selectors) => Box::new(HtmlListAdapter::new(selectors.clone())),
        AdapterConfig::JsonApi(fields) => Box::new(JsonApiAdapter::new(fields.clone())),
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn element_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

// ---------------------------------------------------------------------------
// HTML listing
// ---------------------------------------------------------------------------

/// Scrapes document links out of listing rows.
#[derive(Debug, Clone)]
pub struct HtmlListAdapter {
    selectors: HtmlSelectors,
}

impl HtmlListAdapter {
    pub fn new(selectors: HtmlSelectors) -> Self {
        Self { selectors }
    }

    /// Extract announcements from a page already fetched from `page_url`.
    pub fn parse(&self, html: &str, page_url: &Url) -> Result<Vec<Announcement>> {
        let document = Html::parse_document(html);

        let row_sel = parse_selector(&self.selectors.row_selector)?;
        let link_sel = parse_selector(&self.selectors.link_selector)?;
        let date_sel = self
            .selectors
            .date_selector
            .as_deref()
            .map(parse_selector)
            .transpose()?;
        let extra_sels = self
            .selectors
            .extra
            .iter()
            .map(|(name, sel)| parse_selector(sel).map(|s| (name.as_str(), s)))
            .collect::<Result<Vec<_>>>()?;

        let mut announcements = Vec::new();

        for row in document.select(&row_sel) {
            let links: Vec<ElementRef> = if self.selectors.all_links {
                row.select(&link_sel).collect()
            } else {
                row.select(&link_sel).take(1).collect()
            };
            if links.is_empty() {
                continue;
            }

            let date = date_sel
                .as_ref()
                .and_then(|sel| row.select(sel).next())
                .map(|el| element_text(&el))
                .filter(|d| !d.is_empty());

            for link in links {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };

                let text = element_text(&link);
                let title = if text.is_empty() {
                    link.value()
                        .attr("title")
                        .map(normalize_whitespace)
                        .unwrap_or_default()
                } else {
                    text
                };
                if title.is_empty() {
                    continue;
                }

                let mut announcement = Announcement::new(title, resolve(page_url, href.trim()));
                announcement.date = date.clone();
                for (name, sel) in &extra_sels {
                    if let Some(el) = row.select(sel).next() {
                        announcement = announcement.with_extra(*name, element_text(&el));
                    }
                }
                announcements.push(announcement);
            }
        }

        Ok(announcements)
    }
}

#[async_trait]
impl SourceAdapter for HtmlListAdapter {
    async fn fetch(&self, client: &Client, url: &str) -> Result<Vec<Announcement>> {
        let page_url = Url::parse(url)?;
        let html = fetch_text(client, url).await?;
        self.parse(&html, &page_url)
    }

    fn name(&self) -> &str {
        "html"
    }
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

const UNTITLED: &str = "Untitled Notification";

/// Reads announcements from a JSON notification endpoint.
#[derive(Debug, Clone)]
pub struct JsonApiAdapter {
    fields: JsonApiFields,
}

impl JsonApiAdapter {
    pub fn new(fields: JsonApiFields) -> Self {
        Self { fields }
    }

    /// Extract announcements from a decoded response body.
    pub fn parse(&self, body: &Value) -> Result<Vec<Announcement>> {
        let items = body
            .pointer(&self.fields.items_pointer)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "no item array at '{}'",
                    self.fields.items_pointer
                ))
            })?;

        let announcements = items
            .iter()
            .filter_map(|item| {
                let url = string_field(item, &self.fields.url_field)?;
                let title = self
                    .fields
                    .title_fields
                    .iter()
                    .find_map(|f| string_field(item, f))
                    .unwrap_or_else(|| UNTITLED.to_string());

                let mut announcement = Announcement::new(title, url);
                announcement.date = self
                    .fields
                    .date_field
                    .as_deref()
                    .and_then(|f| string_field(item, f));
                if let Some(kind) = self
                    .fields
                    .kind_field
                    .as_deref()
                    .and_then(|f| string_field(item, f))
                {
                    announcement = announcement.with_extra("type", kind);
                }
                Some(announcement)
            })
            .collect();

        Ok(announcements)
    }
}

/// Non-empty trimmed string value of `item[field]`.
fn string_field(item: &Value, field: &str) -> Option<String> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[async_trait]
impl SourceAdapter for JsonApiAdapter {
    async fn fetch(&self, client: &Client, url: &str) -> Result<Vec<Announcement>> {
        let text = fetch_text(client, url).await?;
        let body: Value = serde_json::from_str(&text)?;
        self.parse(&body)
    }

    fn name(&self) -> &str {
        "json_api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE_PAGE: &str = r#"
        <html><body>
        <div class="table-responsive"><table>
            <tr><th>Title</th><th>Size</th><th>Date</th></tr>
            <tr>
                <td><a href="/docs/round1.pdf">  Round 1
                    Merit List </a></td>
                <td>1.2 MB</td><td>12-07-2025</td>
            </tr>
            <tr>
                <td><a href="https://cdn.example.org/sm.PDF" title="Seat Matrix"></a></td>
                <td>300 KB</td><td></td>
            </tr>
            <tr><td><a href="/about.html">About</a></td></tr>
            <tr><td><a href="/blank.pdf"></a></td></tr>
        </table></div>
        </body></html>
    "#;

    fn page_url() -> Url {
        Url::parse("https://gmch.gov.in/admissions/2025").unwrap()
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector(r#"a[href*=".pdf"]"#).is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_html_rows() {
        let adapter = HtmlListAdapter::new(HtmlSelectors {
            row_selector: ".table-responsive table tr".into(),
            date_selector: Some("td:nth-child(3)".into()),
            extra: [("fileSize".to_string(), "td:nth-child(2)".to_string())]
                .into_iter()
                .collect(),
            ..HtmlSelectors::default()
        });
        let announcements = adapter.parse(TABLE_PAGE, &page_url()).unwrap();

        assert_eq!(announcements.len(), 2);
        assert_eq!(announcements[0].title, "Round 1 Merit List");
        assert_eq!(announcements[0].url, "https://gmch.gov.in/docs/round1.pdf");
        assert_eq!(announcements[0].date.as_deref(), Some("12-07-2025"));
        assert_eq!(announcements[0].extra["fileSize"], "1.2 MB");

        assert_eq!(announcements[1].title, "Seat Matrix");
        assert_eq!(announcements[1].url, "https://cdn.example.org/sm.PDF");
        assert_eq!(announcements[1].date, None);
    }

    #[test]
    fn test_html_all_links_per_row() {
        let html = r#"
            <ul>
              <li><a href="a.pdf">Round 2 Schedule</a> | <a href="b.pdf">Round 2 Seat Matrix</a></li>
              <li><a href="index.htm">Home</a></li>
            </ul>
        "#;
        let base = Url::parse("https://apdhte.nic.in/JEE_dhe_24.htm").unwrap();

        let all = HtmlListAdapter::new(HtmlSelectors {
            row_selector: "li".into(),
            all_links: true,
            ..HtmlSelectors::default()
        });
        let found = all.parse(html, &base).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].url, "https://apdhte.nic.in/b.pdf");

        let first = HtmlListAdapter::new(HtmlSelectors {
            row_selector: "li".into(),
            ..HtmlSelectors::default()
        });
        assert_eq!(first.parse(html, &base).unwrap().len(), 1);
    }

    #[test]
    fn test_html_bad_selector_is_error() {
        let adapter = HtmlListAdapter::new(HtmlSelectors {
            row_selector: "tr[[".into(),
            ..HtmlSelectors::default()
        });
        assert!(matches!(
            adapter.parse(TABLE_PAGE, &page_url()),
            Err(AppError::Selector { .. })
        ));
    }

    fn api_fields() -> JsonApiFields {
        JsonApiFields {
            items_pointer: "/body/notice".into(),
            title_fields: vec!["content".into(), "subject".into()],
            url_field: "extension".into(),
            date_field: Some("publishDate".into()),
            kind_field: Some("subject".into()),
        }
    }

    #[test]
    fn test_json_api_items() {
        let body = json!({
            "body": {
                "notice": [
                    {"content": "Round 1 Allotment Result", "subject": "Result",
                     "extension": "https://b.s3.ap-south-1.amazonaws.com/r1.pdf?X-Amz-Signature=x",
                     "publishDate": "2025-07-30"},
                    {"content": "", "subject": "Schedule", "extension": "https://h/s.pdf"},
                    {"content": "No file", "extension": ""},
                    {"extension": "https://h/u.pdf"}
                ]
            }
        });
        let announcements = JsonApiAdapter::new(api_fields()).parse(&body).unwrap();

        assert_eq!(announcements.len(), 3);
        assert_eq!(announcements[0].title, "Round 1 Allotment Result");
        assert_eq!(announcements[0].date.as_deref(), Some("2025-07-30"));
        assert_eq!(announcements[0].extra["type"], "Result");
        assert_eq!(announcements[1].title, "Schedule");
        assert_eq!(announcements[1].date, None);
        assert_eq!(announcements[2].title, UNTITLED);
    }

    #[test]
    fn test_json_api_missing_array() {
        let adapter = JsonApiAdapter::new(api_fields());
        assert!(adapter.parse(&json!({"body": {}})).is_err());
    }

    #[test]
    fn test_adapter_for_config() {
        let html = adapter_for(&AdapterConfig::Html(HtmlSelectors::default()));
        assert_eq!(html.name(), "html");
        let api = adapter_for(&AdapterConfig::JsonApi(api_fields()));
        assert_eq!(api.name(), "json_api");
    }
}
