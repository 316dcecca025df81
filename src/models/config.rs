//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{DocTag, RoundTag, SourceConfig};
use crate::pipeline::Classifier;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and download behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// State and artifact directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// URL canonicalization rules for fingerprints
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Exclusion vocabulary
    #[serde(default)]
    pub triage: TriageConfig,

    /// Ordered round/type rule tables
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Tracked websites
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.fingerprint.separator.is_empty() {
            return Err(AppError::validation("fingerprint.separator is empty"));
        }
        if self.triage.discard.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::validation("triage.discard contains an empty term"));
        }

        let mut ids = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "source '{}' has an empty id",
                    source.name
                )));
            }
            if !source
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
            {
                return Err(AppError::validation(format!(
                    "source id '{}' may only contain letters, digits, '_' and '-'",
                    source.id
                )));
            }
            if !ids.insert(source.id.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }
        }

        Classifier::from_config(&self.classifier)?;
        Ok(())
    }

    /// Sources with `enabled = true`.
    pub fn enabled_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.enabled)
    }

    /// Find a source by id.
    pub fn source(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.id == id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            paths: PathsConfig::default(),
            fingerprint: FingerprintConfig::default(),
            triage: TriageConfig::default(),
            classifier: ClassifierConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// HTTP client and download behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between artifact downloads in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum sources processed at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Storage locations. Each source gets its own subdirectory in both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "defaults::downloads_dir")]
    pub downloads_dir: PathBuf,
}

impl PathsConfig {
    /// State directory for a source.
    pub fn data_dir_for(&self, source_id: &str) -> PathBuf {
        self.data_dir.join(source_id)
    }

    /// Artifact directory for a source.
    pub fn downloads_dir_for(&self, source_id: &str) -> PathBuf {
        self.downloads_dir.join(source_id)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            downloads_dir: defaults::downloads_dir(),
        }
    }
}

/// Which URLs carry volatile signatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Host substrings of object-storage endpoints
    #[serde(default = "defaults::volatile_hosts")]
    pub volatile_hosts: Vec<String>,

    /// Query parameter names that mark a signed URL
    #[serde(default = "defaults::signature_params")]
    pub signature_params: Vec<String>,

    /// Joins canonical URL and title before hashing
    #[serde(default = "defaults::separator")]
    pub separator: String,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            volatile_hosts: defaults::volatile_hosts(),
            signature_params: defaults::signature_params(),
            separator: defaults::separator(),
        }
    }
}

/// Exclusion vocabulary applied before classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default = "defaults::discard_terms")]
    pub discard: Vec<String>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            discard: defaults::discard_terms(),
        }
    }
}

/// One prioritized classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig<T> {
    pub tag: T,
    /// Regex fragments; matched case-insensitively as whole words
    pub patterns: Vec<String>,
}

impl<T> RuleConfig<T> {
    fn new(tag: T, patterns: &[&str]) -> Self {
        Self {
            tag,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Round and type rule tables. List order is priority order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "defaults::round_rules")]
    pub rounds: Vec<RuleConfig<RoundTag>>,

    #[serde(default = "defaults::type_rules")]
    pub types: Vec<RuleConfig<DocTag>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rounds: defaults::round_rules(),
            types: defaults::type_rules(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::RuleConfig;
    use crate::models::{
        AdapterConfig, DocTag, HtmlSelectors, JsonApiFields, RoundTag, SourceConfig,
    };

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_concurrent() -> usize {
        2
    }

    // Path defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn downloads_dir() -> PathBuf {
        PathBuf::from("downloads")
    }

    // Fingerprint defaults
    pub fn volatile_hosts() -> Vec<String> {
        vec!["s3.ap-south-1.amazonaws.com".into()]
    }
    pub fn signature_params() -> Vec<String> {
        vec!["X-Amz-Signature".into()]
    }
    pub fn separator() -> String {
        "|".into()
    }

    // Triage defaults
    pub fn discard_terms() -> Vec<String> {
        ["Tender", "Recruitment", "Quotation", "Walk-in", "Corrigendum"]
            .iter()
            .map(|t| t.to_string())
            .collect()
    }

    // Classifier defaults
    pub fn round_rules() -> Vec<RuleConfig<RoundTag>> {
        vec![
            RuleConfig::new(RoundTag::SpecialStray, &["special[- ]?stray"]),
            RuleConfig::new(RoundTag::Stray, &["stray[- ]?vacancy"]),
            RuleConfig::new(RoundTag::MopUp, &["mop[- ]?up"]),
            RuleConfig::new(
                RoundTag::Round3,
                &["round[- ]?3", "third[- ]?round", "3rd[- ]?round"],
            ),
            RuleConfig::new(
                RoundTag::Round2,
                &["round[- ]?2", "second[- ]?round", "2nd[- ]?round"],
            ),
            RuleConfig::new(
                RoundTag::Round1,
                &["round[- ]?1", "first[- ]?round", "1st[- ]?round"],
            ),
        ]
    }
    pub fn type_rules() -> Vec<RuleConfig<DocTag>> {
        vec![
            RuleConfig::new(
                DocTag::MeritList,
                &["merit[- ]?list", "rank[- ]?card", "eligible[- ]?candidates"],
            ),
            RuleConfig::new(
                DocTag::Allotment,
                &["allotment", "selection[- ]?list", "result"],
            ),
            RuleConfig::new(
                DocTag::SeatMatrix,
                &["seat[- ]?matrix", "vacancy[- ]?position", "seat[- ]?distribution"],
            ),
            RuleConfig::new(
                DocTag::Schedule,
                &["schedule", "date", "time[- ]?table", "calendar"],
            ),
            RuleConfig::new(
                DocTag::Notice,
                &["notice", "notification", "advertisement", "advt"],
            ),
        ]
    }

    // Source defaults
    pub fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                id: "dme_assam".into(),
                name: "DME Assam".into(),
                url: "https://dme.assam.gov.in/latest/admission-notice-ugpgothersnew".into(),
                enabled: true,
                adapter: AdapterConfig::Html(HtmlSelectors {
                    link_selector: r#"a[href*=".pdf"]"#.into(),
                    extra: [("fileSize".to_string(), "td:nth-child(2)".to_string())]
                        .into_iter()
                        .collect(),
                    ..HtmlSelectors::default()
                }),
            },
            SourceConfig {
                id: "apdhte".into(),
                name: "APDHTE".into(),
                url: "https://apdhte.nic.in/JEE_dhe_24.htm".into(),
                enabled: true,
                adapter: AdapterConfig::Html(HtmlSelectors {
                    row_selector: "li".into(),
                    all_links: true,
                    ..HtmlSelectors::default()
                }),
            },
            SourceConfig {
                id: "bceceb_bihar".into(),
                name: "BCECEB Bihar".into(),
                url: "https://bceceboard.bihar.gov.in/UGMACIndex.php".into(),
                enabled: true,
                adapter: AdapterConfig::Html(HtmlSelectors {
                    row_selector: "li".into(),
                    link_selector: r#"a[href*=".pdf"]"#.into(),
                    ..HtmlSelectors::default()
                }),
            },
            SourceConfig {
                id: "gmch".into(),
                name: "GMCH".into(),
                url: "https://gmch.gov.in/centralized-admission-prospectus-mbbsbdsbhms-courses-session-2025".into(),
                enabled: true,
                adapter: AdapterConfig::Html(HtmlSelectors {
                    row_selector: ".table-responsive table tr".into(),
                    ..HtmlSelectors::default()
                }),
            },
            SourceConfig {
                id: "hry".into(),
                name: "Haryana Medical Recruitment".into(),
                url: "https://hryapi.online-counselling.co.in/v1/api/notifications".into(),
                enabled: true,
                adapter: AdapterConfig::JsonApi(JsonApiFields {
                    items_pointer: "/body/notice".into(),
                    title_fields: vec!["content".into(), "subject".into()],
                    url_field: "extension".into(),
                    date_field: Some("publishDate".into()),
                    kind_field: Some("subject".into()),
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_source_ids() {
        let mut config = Config::default();
        let dup = config.sources[0].clone();
        config.sources.push(dup);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_path_like_source_ids() {
        for id in ["../escape", "a/b", "with space", "."] {
            let mut config = Config::default();
            config.sources[0].id = id.to_string();
            assert!(config.validate().is_err(), "{id} accepted");
        }
    }

    #[test]
    fn validate_rejects_broken_pattern() {
        let mut config = Config::default();
        config.classifier.rounds[0].patterns.push("round[".into());
        assert!(matches!(config.validate(), Err(AppError::Pattern(_))));
    }

    #[test]
    fn partial_file_keeps_default_tables() {
        let config: Config = toml::from_str(
            r#"
            [paths]
            data_dir = "/var/lib/counsel"

            [triage]
            discard = ["Tender"]
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.data_dir, PathBuf::from("/var/lib/counsel"));
        assert_eq!(config.paths.downloads_dir, PathBuf::from("downloads"));
        assert_eq!(config.triage.discard, vec!["Tender"]);
        assert_eq!(config.classifier.rounds[0].tag, RoundTag::SpecialStray);
        assert_eq!(config.sources.len(), 5);
    }

    #[test]
    fn rule_order_follows_file_order() {
        let config: Config = toml::from_str(
            r#"
            [[classifier.rounds]]
            tag = "round_1"
            patterns = ["phase[- ]?1"]

            [[classifier.rounds]]
            tag = "mop_up"
            patterns = ["mop[- ]?up"]
            "#,
        )
        .unwrap();
        let tags: Vec<RoundTag> = config.classifier.rounds.iter().map(|r| r.tag).collect();
        assert_eq!(tags, vec![RoundTag::Round1, RoundTag::MopUp]);
        assert_eq!(config.classifier.types.len(), 5);
    }

    #[test]
    fn per_source_directories() {
        let paths = PathsConfig::default();
        assert_eq!(paths.data_dir_for("gmch"), PathBuf::from("data/gmch"));
        assert_eq!(
            paths.downloads_dir_for("gmch"),
            PathBuf::from("downloads/gmch")
        );
    }
}
