//! Tutor Voice crate - spoken question capture.
//!
//! Provides the `VoiceCapture` trait consumed by the session controller, the
//! lower-level `SpeechRecognizer` seam over a microphone plus recognition
//! service, a shared `CancelFlag` for interrupting an in-flight capture, and
//! mock implementations for testing without audio hardware.

pub mod capture;
pub mod error;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub use capture::{CaptureSettings, RecognizerCapture};
pub use error::VoiceError;

// =============================================================================
// Types
// =============================================================================

/// Per-attempt listening limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenLimits {
    /// How long to wait for speech to begin.
    pub timeout: Duration,
    /// Maximum length of one phrase once speech has begun.
    pub phrase_time_limit: Duration,
}

/// Shared interrupt signal for a voice capture.
///
/// Clones observe the same flag. The capture polls it between listen
/// attempts, so an interrupt takes effect at the next attempt boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Captures one spoken question.
///
/// Blocking: implementations hold the microphone for several seconds and must
/// be called off the caller's interactive thread.
pub trait VoiceCapture: Send + Sync {
    /// Returns `Ok(Some(text))` with a trimmed transcript, `Ok(None)` when
    /// nothing usable was heard or the capture was cancelled, and `Err` when
    /// the audio device itself is unusable.
    fn capture(&self, cancel: &CancelFlag) -> Result<Option<String>, VoiceError>;
}

/// Microphone plus speech recognition service.
pub trait SpeechRecognizer: Send + Sync {
    /// Sample ambient noise to set the energy threshold.
    fn calibrate(&self, duration: Duration) -> Result<(), VoiceError>;

    /// Listen for one phrase and transcribe it.
    ///
    /// `Ok(None)` means the phrase transcribed to nothing. No speech before
    /// the timeout is `ListenTimeout`; audio that could not be understood is
    /// `Unrecognized`.
    fn listen(&self, limits: &ListenLimits) -> Result<Option<String>, VoiceError>;
}

// =============================================================================
// Mock implementations
// =============================================================================

/// One scripted outcome of a `MockRecognizer::listen` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockUtterance {
    Speech(String),
    /// Audio was heard but could not be understood.
    Unintelligible,
    /// The phrase transcribed to an empty result.
    Silence,
    /// No speech began before the timeout.
    Timeout,
}

/// Mock recognizer for testing.
///
/// Replays its script in order, then repeats the final entry. An empty
/// script times out on every attempt.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    script: Mutex<VecDeque<MockUtterance>>,
    last: Mutex<Option<MockUtterance>>,
    listen_delay: Duration,
    no_device: bool,
    listens: Arc<AtomicUsize>,
}

impl MockRecognizer {
    pub fn scripted(script: Vec<MockUtterance>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// A recognizer that always hears `text` on the first attempt.
    pub fn speaking(text: impl Into<String>) -> Self {
        Self::scripted(vec![MockUtterance::Speech(text.into())])
    }

    /// A recognizer whose microphone cannot be opened.
    pub fn no_device() -> Self {
        Self {
            no_device: true,
            ..Self::default()
        }
    }

    /// Sleep this long inside every `listen` call.
    pub fn with_listen_delay(mut self, delay: Duration) -> Self {
        self.listen_delay = delay;
        self
    }

    /// Shared counter of `listen` calls, readable after the recognizer moves.
    pub fn listen_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.listens)
    }

    fn next_utterance(&self) -> MockUtterance {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = script.pop_front() {
            *last = Some(next.clone());
            return next;
        }
        last.clone().unwrap_or(MockUtterance::Timeout)
    }
}

impl SpeechRecognizer for MockRecognizer {
    fn calibrate(&self, _duration: Duration) -> Result<(), VoiceError> {
        if self.no_device {
            return Err(VoiceError::DeviceUnavailable(
                "mock microphone missing".to_string(),
            ));
        }
        Ok(())
    }

    fn listen(&self, _limits: &ListenLimits) -> Result<Option<String>, VoiceError> {
        if self.no_device {
            return Err(VoiceError::DeviceUnavailable(
                "mock microphone missing".to_string(),
            ));
        }
        self.listens.fetch_add(1, Ordering::SeqCst);
        if !self.listen_delay.is_zero() {
            std::thread::sleep(self.listen_delay);
        }
        match self.next_utterance() {
            MockUtterance::Speech(text) => Ok(Some(text)),
            MockUtterance::Unintelligible => Err(VoiceError::Unrecognized),
            MockUtterance::Silence => Ok(None),
            MockUtterance::Timeout => Err(VoiceError::ListenTimeout),
        }
    }
}
