//! Reference voice capture: calibrate once, then a bounded number of listen
//! attempts, polling the cancel flag before each one.

use std::time::Duration;

use tutor_core::config::VoiceConfig;

use crate::error::VoiceError;
use crate::{CancelFlag, ListenLimits, SpeechRecognizer, VoiceCapture};

/// Capture settings derived from `VoiceConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    pub max_attempts: u32,
    pub limits: ListenLimits,
    pub ambient_calibration: Duration,
    /// Transcripts must be longer than this many characters after trimming.
    pub min_transcript_chars: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from(&VoiceConfig::default())
    }
}

impl From<&VoiceConfig> for CaptureSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            limits: ListenLimits {
                timeout: Duration::from_secs(config.attempt_timeout_secs),
                phrase_time_limit: Duration::from_secs(config.phrase_time_limit_secs),
            },
            ambient_calibration: Duration::from_secs(config.ambient_calibration_secs),
            min_transcript_chars: config.min_transcript_chars,
        }
    }
}

/// `VoiceCapture` backed by a `SpeechRecognizer`.
#[derive(Debug)]
pub struct RecognizerCapture<R> {
    recognizer: R,
    settings: CaptureSettings,
}

impl<R: SpeechRecognizer> RecognizerCapture<R> {
    pub fn new(recognizer: R, settings: CaptureSettings) -> Self {
        Self {
            recognizer,
            settings,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    fn accept(&self, transcript: &str) -> Option<String> {
        let trimmed = transcript.trim();
        (trimmed.chars().count() > self.settings.min_transcript_chars)
            .then(|| trimmed.to_string())
    }
}

impl<R: SpeechRecognizer> VoiceCapture for RecognizerCapture<R> {
    fn capture(&self, cancel: &CancelFlag) -> Result<Option<String>, VoiceError> {
        if cancel.is_cancelled() {
            tracing::debug!("Capture cancelled before start");
            return Ok(None);
        }

        self.recognizer
            .calibrate(self.settings.ambient_calibration)?;
        tracing::info!(max_attempts = self.settings.max_attempts, "Listening...");

        for attempt in 1..=self.settings.max_attempts {
            if cancel.is_cancelled() {
                tracing::info!(attempt, "Capture interrupted");
                return Ok(None);
            }

            match self.recognizer.listen(&self.settings.limits) {
                Ok(Some(transcript)) => {
                    if let Some(text) = self.accept(&transcript) {
                        tracing::info!(attempt, text_len = text.len(), "Speech captured");
                        return Ok(Some(text));
                    }
                    tracing::debug!(attempt, "Transcript too short, listening again");
                }
                Ok(None) => tracing::debug!(attempt, "Nothing recognized"),
                Err(e) => tracing::debug!(attempt, error = %e, "Listen attempt failed"),
            }
        }

        tracing::info!("No usable speech after all attempts");
        Ok(None)
    }
}
