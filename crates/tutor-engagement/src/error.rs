//! Error types for engagement tracking.

use tutor_core::error::TutorError;

/// Errors from the engagement subsystem.
#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("detector failed to load: {0}")]
    DetectorInit(String),
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("frame source error: {0}")]
    FrameSource(String),
}

impl From<EngagementError> for TutorError {
    fn from(err: EngagementError) -> Self {
        match err {
            EngagementError::DetectorInit(msg) => TutorError::DetectorInit(msg),
            other => TutorError::Engagement(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_error_display() {
        let err = EngagementError::DetectorInit("cascade file missing".to_string());
        assert_eq!(err.to_string(), "detector failed to load: cascade file missing");

        let err = EngagementError::Detection("model crashed".to_string());
        assert_eq!(err.to_string(), "face detection failed: model crashed");

        let err = EngagementError::InvalidFrame("zero area".to_string());
        assert_eq!(err.to_string(), "invalid frame: zero area");

        let err = EngagementError::FrameSource("camera busy".to_string());
        assert_eq!(err.to_string(), "frame source error: camera busy");
    }

    #[test]
    fn test_detector_init_maps_to_fatal_variant() {
        let err: TutorError = EngagementError::DetectorInit("no model".to_string()).into();
        assert!(matches!(err, TutorError::DetectorInit(ref msg) if msg == "no model"));
    }

    #[test]
    fn test_per_frame_errors_map_to_engagement_variant() {
        let err: TutorError = EngagementError::InvalidFrame("empty".to_string()).into();
        assert!(matches!(err, TutorError::Engagement(_)));
        assert!(err.to_string().contains("invalid frame: empty"));
    }
}
