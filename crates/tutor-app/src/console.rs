//! Line-oriented console front end: command parsing and response rendering.

use tutor_core::types::QueryResponse;
use tutor_session::SessionStatus;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask a typed question.
    Ask(String),
    /// Start a voice capture.
    Voice,
    /// Stop the in-flight voice capture.
    Interrupt,
    /// Forget the conversation.
    Clear,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse a console line. Unknown slash commands fall back to `Help`.
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let Some(name) = trimmed.strip_prefix('/') else {
            return Command::Ask(line.to_string());
        };
        match name.to_ascii_lowercase().as_str() {
            "voice" | "v" => Command::Voice,
            "interrupt" | "stop" => Command::Interrupt,
            "clear" => Command::Clear,
            "status" => Command::Status,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Help,
        }
    }
}

pub const HELP: &str = "\
Type a question and press Enter, or use a command:
  /voice      ask by speaking
  /interrupt  stop listening
  /clear      start a fresh conversation
  /status     show session status
  /quit       exit";

/// Plain-text rendering of an answer.
pub fn render_response(response: &QueryResponse) -> String {
    let mut out = if response.success {
        format!(
            "{} [{} {}]",
            response.text,
            response.engagement.icon(),
            response.engagement
        )
    } else {
        response.text.clone()
    };
    if let Some(ref tips) = response.tips {
        out.push_str("\nStudy tips:");
        for tip in tips {
            out.push_str("\n  - ");
            out.push_str(tip);
        }
    }
    out
}

pub fn render_status(status: &SessionStatus) -> String {
    let engagement = status
        .last_engagement
        .map(|label| label.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "session {} (since {}) | {} | answered {} | last engagement {}",
        status.session_id,
        status.started_at.format("%H:%M:%S"),
        status.phase,
        status.questions_answered,
        engagement
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::types::EngagementLabel;
    use tutor_session::format_response;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/voice"), Command::Voice);
        assert_eq!(Command::parse(" /V "), Command::Voice);
        assert_eq!(Command::parse("/interrupt"), Command::Interrupt);
        assert_eq!(Command::parse("/clear"), Command::Clear);
        assert_eq!(Command::parse("/status"), Command::Status);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/bogus"), Command::Help);
    }

    #[test]
    fn test_parse_question_keeps_text() {
        assert_eq!(
            Command::parse("What is a noun?"),
            Command::Ask("What is a noun?".to_string())
        );
        assert_eq!(Command::parse(""), Command::Ask(String::new()));
    }

    #[test]
    fn test_render_struggling_lists_tips() {
        let response = format_response("A noun names a thing.", Some(EngagementLabel::Struggling));
        let text = render_response(&response);
        assert!(text.starts_with("A noun names a thing."));
        assert!(text.contains("Struggling"));
        assert!(text.contains("  - Try drawing a diagram of this concept"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_render_status_shows_start_time() {
        let started_at = chrono::Utc::now();
        let status = SessionStatus {
            session_id: uuid::Uuid::nil(),
            started_at,
            phase: tutor_session::SessionPhase::Idle,
            processing: false,
            listening: false,
            last_engagement: None,
            questions_answered: 0,
        };
        let text = render_status(&status);
        assert!(text.contains(&started_at.format("%H:%M:%S").to_string()));
        assert!(text.contains("Idle"));
        assert!(text.ends_with("last engagement -"));
    }

    #[test]
    fn test_render_engaged_has_no_tips() {
        let response = format_response("A verb is an action.", Some(EngagementLabel::Engaged));
        let text = render_response(&response);
        assert!(!text.contains("Study tips"));
        assert_eq!(text.lines().count(), 1);
    }
}
