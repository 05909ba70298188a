//! Error types for voice capture.

use tutor_core::error::TutorError;

/// Errors from voice capture and speech recognition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("no speech started before the timeout")]
    ListenTimeout,
    #[error("speech was not recognized")]
    Unrecognized,
}

impl From<VoiceError> for TutorError {
    fn from(err: VoiceError) -> Self {
        TutorError::Capture(err.to_string())
    }
}
