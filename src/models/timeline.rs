//! Per-source round timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{Event, RoundTag};

/// Events of a single round, in scrape order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundBucket {
    pub label: String,
    pub events: Vec<Event>,
}

/// Round-bucketed view of one source's announcements.
///
/// All seven buckets are present, even when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Source display name
    #[serde(rename = "website")]
    pub source_name: String,

    pub updated_at: DateTime<Utc>,

    pub rounds: BTreeMap<RoundTag, RoundBucket>,
}

impl Timeline {
    /// Create a timeline with every bucket empty.
    pub fn new(source_name: impl Into<String>) -> Self {
        let rounds = RoundTag::ALL
            .iter()
            .map(|tag| {
                (
                    *tag,
                    RoundBucket {
                        label: tag.label().to_string(),
                        events: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            source_name: source_name.into(),
            updated_at: Utc::now(),
            rounds,
        }
    }

    /// Append an event to a round bucket.
    pub fn push(&mut self, round: RoundTag, event: Event) {
        self.rounds
            .entry(round)
            .or_insert_with(|| RoundBucket {
                label: round.label().to_string(),
                events: Vec::new(),
            })
            .events
            .push(event);
    }

    /// Events in a round bucket.
    pub fn events(&self, round: RoundTag) -> &[Event] {
        self.rounds
            .get(&round)
            .map(|bucket| bucket.events.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of events across all buckets.
    pub fn event_count(&self) -> usize {
        self.rounds.values().map(|b| b.events.len()).sum()
    }
}
