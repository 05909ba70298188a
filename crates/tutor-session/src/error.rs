//! Error types for the session controller.

use tutor_core::error::TutorError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to start voice worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

impl From<SessionError> for TutorError {
    fn from(err: SessionError) -> Self {
        TutorError::Session(err.to_string())
    }
}
