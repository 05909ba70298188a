//! Turning generator output into a `QueryResponse`.

use chrono::Utc;

use tutor_core::types::{EngagementLabel, QueryResponse};

/// Returned without calling the generator when the question is too short.
pub const INCOMPLETE_QUESTION: &str = "Please ask a complete question";

/// Returned when the generator fails.
pub const TECHNICAL_DIFFICULTIES: &str =
    "I'm having technical difficulties. Please try again later.";

/// Study tips attached to answers given while the student is struggling.
pub const STRUGGLING_TIPS: [&str; 3] = [
    "Try drawing a diagram of this concept",
    "Explain this to a friend in your own words",
    "Find a real-world example of this",
];

/// Build a successful response. A missing label is reported as `Neutral`.
pub fn format_response(text: impl Into<String>, engagement: Option<EngagementLabel>) -> QueryResponse {
    let engagement = engagement.unwrap_or_default();
    let tips = (engagement == EngagementLabel::Struggling)
        .then(|| STRUGGLING_TIPS.iter().map(|tip| tip.to_string()).collect());
    QueryResponse {
        text: text.into(),
        timestamp: Utc::now(),
        engagement,
        success: true,
        tips,
    }
}

/// Build a non-success response carrying a message safe to show the student.
pub fn failure_response(message: impl Into<String>) -> QueryResponse {
    QueryResponse {
        text: message.into(),
        timestamp: Utc::now(),
        engagement: EngagementLabel::Neutral,
        success: false,
        tips: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struggling_gets_tips_in_order() {
        let response = format_response("Fractions split a whole.", Some(EngagementLabel::Struggling));
        assert!(response.success);
        let tips = response.tips.unwrap();
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0], "Try drawing a diagram of this concept");
        assert_eq!(tips[1], "Explain this to a friend in your own words");
        assert_eq!(tips[2], "Find a real-world example of this");
    }

    #[test]
    fn test_other_labels_get_no_tips() {
        for label in EngagementLabel::ALL {
            if label == EngagementLabel::Struggling {
                continue;
            }
            let response = format_response("answer", Some(label));
            assert_eq!(response.tips, None, "label {}", label);
            assert_eq!(response.engagement, label);
        }
    }

    #[test]
    fn test_missing_engagement_defaults_to_neutral() {
        let response = format_response("answer", None);
        assert_eq!(response.engagement, EngagementLabel::Neutral);
        assert_eq!(response.tips, None);
    }

    #[test]
    fn test_failure_response() {
        let response = failure_response(INCOMPLETE_QUESTION);
        assert!(!response.success);
        assert_eq!(response.text, "Please ask a complete question");
        assert_eq!(response.engagement, EngagementLabel::Neutral);
        assert_eq!(response.tips, None);
    }

    #[test]
    fn test_timestamps_are_current() {
        let before = Utc::now();
        let response = format_response("answer", None);
        assert!(response.timestamp >= before);
        assert!(response.timestamp <= Utc::now());
    }
}
