//! Exclusion filter applied before classification.

use crate::models::TriageConfig;

/// Discards titles containing any excluded term (case-insensitive substring).
#[derive(Debug, Clone, Default)]
pub struct TriageFilter {
    terms: Vec<String>,
}

impl TriageFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &TriageConfig) -> Self {
        Self::new(&config.discard)
    }

    /// First excluded term found in the title.
    pub fn matched_term(&self, title: &str) -> Option<&str> {
        let title = title.to_lowercase();
        self.terms
            .iter()
            .find(|term| title.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn should_discard(&self, title: &str) -> bool {
        self.matched_term(title).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let filter = TriageFilter::from_config(&TriageConfig::default());
        assert!(filter.should_discard("Walk-in Interview Notice"));
        assert!(filter.should_discard("TENDER for printing of forms"));
        assert!(filter.should_discard("Corrigendum to Round 2 schedule"));
        assert!(!filter.should_discard("Round 2 Merit List Published"));
    }

    #[test]
    fn test_substring_match() {
        let filter = TriageFilter::new(["recruit"]);
        assert_eq!(filter.matched_term("Staff Recruitment 2025"), Some("recruit"));
    }

    #[test]
    fn test_empty_vocabulary_keeps_everything() {
        let filter = TriageFilter::new(Vec::<String>::new());
        assert!(!filter.should_discard("Tender"));
    }
}
