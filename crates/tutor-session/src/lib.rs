//! Tutor Session crate - the controller the presentation layer talks to.
//!
//! Validates questions, serializes generator calls behind a single-flight
//! lock, attaches the student's engagement label and study tips to answers,
//! and runs voice captures on a worker thread behind a try-claim slot with
//! cooperative interruption.

pub mod controller;
pub mod error;
pub mod response;
pub mod state;

pub use controller::{SessionController, VoiceStart};
pub use error::SessionError;
pub use response::{format_response, STRUGGLING_TIPS};
pub use state::{SessionPhase, SessionState, SessionStatus};
