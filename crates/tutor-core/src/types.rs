use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp alias used across readings and responses.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// Enums
// =============================================================================

/// Coarse engagement signal inferred from the webcam feed.
///
/// The label set is closed. `Confused` is part of the display vocabulary but
/// the face-geometry classifier never emits it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EngagementLabel {
    /// Face fills a large share of the frame: leaning in.
    Engaged = 0,
    /// Face at a moderate distance.
    Thinking = 1,
    /// Reserved display state; never produced by classification.
    Confused = 2,
    /// A face was found but it is small or far away.
    Struggling = 3,
    /// No face detected, or analysis failed.
    #[default]
    Neutral = 4,
}

impl EngagementLabel {
    /// All labels in display order.
    pub const ALL: [EngagementLabel; 5] = [
        EngagementLabel::Engaged,
        EngagementLabel::Thinking,
        EngagementLabel::Confused,
        EngagementLabel::Struggling,
        EngagementLabel::Neutral,
    ];

    /// Emoji shown in the webcam overlay.
    pub fn icon(&self) -> &'static str {
        match self {
            EngagementLabel::Engaged => "\u{1F60A}",
            EngagementLabel::Thinking => "\u{1F914}",
            EngagementLabel::Confused => "\u{1F615}",
            EngagementLabel::Struggling => "\u{1F61E}",
            EngagementLabel::Neutral => "\u{1F610}",
        }
    }

    /// Hex color used for the overlay badge.
    pub fn color(&self) -> &'static str {
        match self {
            EngagementLabel::Engaged => "#4CAF50",
            EngagementLabel::Thinking => "#FFC107",
            EngagementLabel::Confused => "#FF9800",
            EngagementLabel::Struggling => "#F44336",
            EngagementLabel::Neutral => "#9E9E9E",
        }
    }

    /// Compact encoding for lock-free storage.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a value produced by [`EngagementLabel::as_u8`]. Unknown values
    /// decode to `Neutral`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => EngagementLabel::Engaged,
            1 => EngagementLabel::Thinking,
            2 => EngagementLabel::Confused,
            3 => EngagementLabel::Struggling,
            _ => EngagementLabel::Neutral,
        }
    }
}

impl fmt::Display for EngagementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngagementLabel::Engaged => write!(f, "Engaged"),
            EngagementLabel::Thinking => write!(f, "Thinking"),
            EngagementLabel::Confused => write!(f, "Confused"),
            EngagementLabel::Struggling => write!(f, "Struggling"),
            EngagementLabel::Neutral => write!(f, "Neutral"),
        }
    }
}

// =============================================================================
// Structs
// =============================================================================

/// Result of analyzing a single video frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagementReading {
    pub label: EngagementLabel,
    pub icon: String,
    pub color: String,
    pub timestamp: Timestamp,
}

impl EngagementReading {
    /// Build a reading for `label` stamped with the current time.
    pub fn now(label: EngagementLabel) -> Self {
        Self {
            label,
            icon: label.icon().to_string(),
            color: label.color().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One entry in the classifier's rolling engagement history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub label: EngagementLabel,
    pub timestamp: Timestamp,
}

/// Structured answer handed to the presentation layer.
///
/// `tips` is present if and only if `engagement` is `Struggling`. When
/// `success` is false, `text` is a plain-language message safe to show the
/// student.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub text: String,
    pub timestamp: Timestamp,
    pub engagement: EngagementLabel,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}
