//! Classification tags and timeline events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counselling round an announcement belongs to.
///
/// Variant order is the display order of timeline buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundTag {
    #[serde(rename = "round_1")]
    Round1,
    #[serde(rename = "round_2")]
    Round2,
    #[serde(rename = "round_3")]
    Round3,
    MopUp,
    Stray,
    SpecialStray,
    General,
}

impl RoundTag {
    /// Every round, in bucket order.
    pub const ALL: [RoundTag; 7] = [
        RoundTag::Round1,
        RoundTag::Round2,
        RoundTag::Round3,
        RoundTag::MopUp,
        RoundTag::Stray,
        RoundTag::SpecialStray,
        RoundTag::General,
    ];

    /// Stable machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundTag::Round1 => "round_1",
            RoundTag::Round2 => "round_2",
            RoundTag::Round3 => "round_3",
            RoundTag::MopUp => "mop_up",
            RoundTag::Stray => "stray",
            RoundTag::SpecialStray => "special_stray",
            RoundTag::General => "general",
        }
    }

    /// Human-readable bucket label.
    pub fn label(&self) -> &'static str {
        match self {
            RoundTag::Round1 => "Round 1 Counselling",
            RoundTag::Round2 => "Round 2 Counselling",
            RoundTag::Round3 => "Round 3 Counselling",
            RoundTag::MopUp => "Mop-Up Round",
            RoundTag::Stray => "Stray Vacancy Round",
            RoundTag::SpecialStray => "Special Stray Vacancy Round",
            RoundTag::General => "General Notices",
        }
    }
}

impl fmt::Display for RoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of document an announcement points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocTag {
    MeritList,
    Allotment,
    SeatMatrix,
    Schedule,
    Notice,
    Other,
}

impl DocTag {
    /// Stable machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocTag::MeritList => "merit_list",
            DocTag::Allotment => "allotment",
            DocTag::SeatMatrix => "seat_matrix",
            DocTag::Schedule => "schedule",
            DocTag::Notice => "notice",
            DocTag::Other => "other",
        }
    }
}

impl fmt::Display for DocTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub round: RoundTag,
    #[serde(rename = "type")]
    pub doc_type: DocTag,
}

/// A triaged, classified announcement ready for the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Short fingerprint (first 16 hex chars)
    pub id: String,

    pub title: String,

    /// Source date, or scrape timestamp when the source had none
    pub date: String,

    #[serde(rename = "type")]
    pub doc_type: DocTag,

    pub url: String,

    /// Always `false`; kept for output compatibility.
    #[serde(default)]
    pub is_new: bool,
}
