//! Session phase and the small amount of per-session bookkeeping the
//! controller keeps between calls.
//!
//! The query path and the voice path are independent:
//! - Idle -> Processing -> Idle (a question is being answered)
//! - Idle -> Listening -> Idle (a voice capture is in flight)
//!
//! A voice capture may run while a query is processing. The reported phase
//! prefers `Processing` in that case.

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use tutor_core::types::{EngagementLabel, Timestamp};

/// Coarse activity of a session, as shown by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Nothing in flight.
    Idle,
    /// A voice capture holds the microphone.
    Listening,
    /// A question is being answered.
    Processing,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "Idle"),
            SessionPhase::Listening => write!(f, "Listening"),
            SessionPhase::Processing => write!(f, "Processing"),
        }
    }
}

impl SessionPhase {
    /// Derive the phase from the two activity flags.
    pub fn from_flags(processing: bool, listening: bool) -> Self {
        if processing {
            SessionPhase::Processing
        } else if listening {
            SessionPhase::Listening
        } else {
            SessionPhase::Idle
        }
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub started_at: Timestamp,
    pub phase: SessionPhase,
    pub processing: bool,
    pub listening: bool,
    /// Label attached to the most recent successful answer, if any since the
    /// last `clear_conversation`.
    pub last_engagement: Option<EngagementLabel>,
    pub questions_answered: u64,
}

/// Mutable per-session bookkeeping.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub started_at: Timestamp,
    pub last_engagement: Option<EngagementLabel>,
    pub questions_answered: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            last_engagement: None,
            questions_answered: 0,
        }
    }

    /// Note a successful answer carrying `label`.
    pub fn record_answer(&mut self, label: EngagementLabel) {
        self.last_engagement = Some(label);
        self.questions_answered += 1;
    }

    /// Forget the last attached label. The session id and counters survive.
    pub fn reset_engagement(&mut self) {
        self.last_engagement = None;
    }
}
