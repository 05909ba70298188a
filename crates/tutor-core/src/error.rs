use thiserror::Error;

/// Top-level error type for the tutoring system.
///
/// Each subsystem crate defines its own error type and implements
/// `From<SubsystemError> for TutorError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TutorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engagement detector failed to initialize: {0}")]
    DetectorInit(String),

    #[error("Engagement analysis error: {0}")]
    Engagement(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Voice capture error: {0}")]
    Capture(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for TutorError {
    fn from(err: toml::de::Error) -> Self {
        TutorError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for TutorError {
    fn from(err: toml::ser::Error) -> Self {
        TutorError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TutorError {
    fn from(err: serde_json::Error) -> Self {
        TutorError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for tutoring operations.
pub type Result<T> = std::result::Result<T, TutorError>;
