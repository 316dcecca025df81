//! Builds the per-source round timeline and the flat event list.

use crate::error::Result;
use crate::models::{Announcement, Config, Event, Timeline};

use super::classify::Classifier;
use super::fingerprint::Fingerprinter;
use super::triage::TriageFilter;

/// Triage, classification and bucketing in one pass.
#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    fingerprinter: Fingerprinter,
    classifier: Classifier,
    triage: TriageFilter,
}

impl TimelineBuilder {
    pub fn new(fingerprinter: Fingerprinter, classifier: Classifier, triage: TriageFilter) -> Self {
        Self {
            fingerprinter,
            classifier,
            triage,
        }
    }

    /// Build from the fingerprint, classifier and triage sections of a config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Fingerprinter::new(&config.fingerprint),
            Classifier::from_config(&config.classifier)?,
            TriageFilter::from_config(&config.triage),
        ))
    }

    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn triage(&self) -> &TriageFilter {
        &self.triage
    }

    /// Turn surviving announcements into events, in input order.
    ///
    /// Events keep scrape order in both the buckets and the flat list; no
    /// date sorting is attempted.
    pub fn build(&self, source_name: &str, announcements: &[Announcement]) -> (Timeline, Vec<Event>) {
        let mut timeline = Timeline::new(source_name);
        let mut events = Vec::new();
        let mut discarded = 0usize;

        for announcement in announcements {
            if let Some(term) = self.triage.matched_term(&announcement.title) {
                log::debug!("Discarding '{}' (matched '{}')", announcement.title, term);
                discarded += 1;
                continue;
            }

            let classification = self.classifier.classify(&announcement.title);
            let fingerprint = self.fingerprinter.of_announcement(announcement);

            let event = Event {
                id: fingerprint.short().to_string(),
                title: announcement.title.clone(),
                date: announcement.effective_date(),
                doc_type: classification.doc_type,
                url: announcement.url.clone(),
                is_new: false,
            };

            timeline.push(classification.round, event.clone());
            events.push(event);
        }

        if discarded > 0 {
            log::info!(
                "{}: discarded {} of {} announcements",
                source_name,
                discarded,
                announcements.len()
            );
        }

        (timeline, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocTag, RoundTag};

    fn builder() -> TimelineBuilder {
        TimelineBuilder::from_config(&Config::default()).unwrap()
    }

    fn ann(title: &str, path: &str) -> Announcement {
        Announcement::new(title, format!("https://example.com/{path}"))
    }

    #[test]
    fn test_single_round_2_merit_list() {
        let (timeline, events) =
            builder().build("Test", &[ann("Round 2 Merit List Published", "r2.pdf")]);

        assert_eq!(events.len(), 1);
        let bucket = timeline.events(RoundTag::Round2);
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket[0].doc_type, DocTag::MeritList);
        for tag in RoundTag::ALL.iter().filter(|t| **t != RoundTag::Round2) {
            assert!(timeline.events(*tag).is_empty(), "{tag} not empty");
        }
    }

    #[test]
    fn test_discarded_items_never_appear() {
        let (timeline, events) = builder().build(
            "Test",
            &[
                ann("Walk-in Interview Notice", "w.pdf"),
                ann("Round 1 Schedule", "r1.pdf"),
            ],
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Round 1 Schedule");
        assert_eq!(timeline.event_count(), 1);
        assert!(timeline.events(RoundTag::General).is_empty());
    }

    #[test]
    fn test_input_order_preserved() {
        let input = vec![
            ann("Round 1 Result", "a.pdf").with_date("2025-07-20"),
            ann("General notice", "b.pdf").with_date("2025-06-01"),
            ann("Round 1 Schedule", "c.pdf").with_date("2025-07-01"),
        ];
        let (timeline, events) = builder().build("Test", &input);

        let flat: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(flat, vec!["Round 1 Result", "General notice", "Round 1 Schedule"]);

        let round_1: Vec<&str> = timeline
            .events(RoundTag::Round1)
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(round_1, vec!["Round 1 Result", "Round 1 Schedule"]);
    }

    #[test]
    fn test_event_fields() {
        let b = builder();
        let a = ann("Seat Matrix Round 3", "sm.pdf");
        let (_, events) = b.build("Test", std::slice::from_ref(&a));
        let event = &events[0];

        let fp = b.fingerprinter().of_announcement(&a);
        assert_eq!(event.id, fp.short());
        assert_eq!(event.id.len(), 16);
        assert_eq!(event.date, a.scraped_date.to_rfc3339());
        assert_eq!(event.doc_type, DocTag::SeatMatrix);
        assert!(!event.is_new);
    }

    #[test]
    fn test_empty_input() {
        let (timeline, events) = builder().build("Empty", &[]);
        assert!(events.is_empty());
        assert_eq!(timeline.rounds.len(), 7);
        assert_eq!(timeline.event_count(), 0);
    }
}
