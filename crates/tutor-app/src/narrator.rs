//! Text-to-speech boundary.

/// Reads answers aloud.
pub trait Narrator: Send + Sync {
    fn speak(&self, text: &str);
}

/// Narrator for headless runs: logs what would have been spoken.
#[derive(Debug, Default)]
pub struct LogNarrator;

impl Narrator for LogNarrator {
    fn speak(&self, text: &str) {
        tracing::info!(text_len = text.len(), "Speaking: {}", text);
    }
}
