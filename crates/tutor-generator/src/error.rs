//! Error types for answer generation.

use tutor_core::error::TutorError;

/// Errors from the response generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("text model is not loaded")]
    NotReady,
    #[error("model error: {0}")]
    Model(String),
}

impl From<GeneratorError> for TutorError {
    fn from(err: GeneratorError) -> Self {
        TutorError::Generation(err.to_string())
    }
}
