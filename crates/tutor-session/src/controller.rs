//! Session controller coordinating questions, voice capture and engagement.
//!
//! The controller owns two pieces of mutual exclusion:
//! - a blocking processing lock so at most one question is inside the
//!   generator at a time;
//! - a try-claim voice slot so at most one capture holds the microphone.
//!
//! Each has a single release point (an RAII guard), so every exit path,
//! including unwinding, frees it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tutor_core::config::SessionConfig;
use tutor_core::types::QueryResponse;
use tutor_engagement::EngagementSource;
use tutor_generator::ResponseGenerator;
use tutor_voice::{CancelFlag, VoiceCapture};

use crate::error::SessionError;
use crate::response::{self, INCOMPLETE_QUESTION, TECHNICAL_DIFFICULTIES};
use crate::state::{SessionPhase, SessionState, SessionStatus};

/// Outcome of `SessionController::start_voice_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStart {
    /// A worker was spawned and will invoke the callback exactly once.
    Started,
    /// Another capture is in flight. The request was dropped and its callback
    /// will never run.
    Busy,
}

/// Clears a flag when dropped.
struct FlagGuard(Arc<AtomicBool>);

impl FlagGuard {
    /// Set `flag` if it is clear. Returns `None` when it was already set.
    fn try_claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlagGuard(Arc::clone(flag)))
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Entry point for the presentation layer.
///
/// Built once at startup from shared handles to the generator, the engagement
/// source and the voice capture. All methods take `&self`, so the controller
/// can be shared behind an `Arc`.
pub struct SessionController {
    generator: Arc<dyn ResponseGenerator>,
    engagement: Arc<dyn EngagementSource>,
    voice: Arc<dyn VoiceCapture>,
    config: SessionConfig,
    processing_lock: Mutex<()>,
    processing: Arc<AtomicBool>,
    voice_slot: Arc<AtomicBool>,
    cancel: CancelFlag,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        engagement: Arc<dyn EngagementSource>,
        voice: Arc<dyn VoiceCapture>,
        config: SessionConfig,
    ) -> Self {
        let state = SessionState::new();
        tracing::info!(session_id = %state.id, "Tutoring session started");
        Self {
            generator,
            engagement,
            voice,
            config,
            processing_lock: Mutex::new(()),
            processing: Arc::new(AtomicBool::new(false)),
            voice_slot: Arc::new(AtomicBool::new(false)),
            cancel: CancelFlag::new(),
            state: Mutex::new(state),
        }
    }

    /// Answer one question.
    ///
    /// Never fails: invalid input and generator failures come back as
    /// non-success responses. Blocks while another question is processing.
    pub fn process_query(&self, question: &str) -> QueryResponse {
        let trimmed = question.trim();
        if trimmed.is_empty() || trimmed.chars().count() < self.config.min_question_chars {
            tracing::debug!(len = trimmed.len(), "Rejected incomplete question");
            return response::failure_response(INCOMPLETE_QUESTION);
        }

        // The lock guards no data, so a poisoned lock is still usable.
        let _lock = self
            .processing_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.processing.store(true, Ordering::Release);
        let _processing = FlagGuard(Arc::clone(&self.processing));

        tracing::info!(question_len = trimmed.len(), "Processing question");
        let generated = panic::catch_unwind(AssertUnwindSafe(|| self.generator.generate(question)));
        let answer = match generated {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Response generation failed");
                return response::failure_response(TECHNICAL_DIFFICULTIES);
            }
            Err(_) => {
                tracing::error!("Response generator panicked");
                return response::failure_response(TECHNICAL_DIFFICULTIES);
            }
        };

        // Read after generation, so the label reflects the student at answer time.
        let label = self.engagement.last_status();
        self.lock_state().record_answer(label);
        tracing::info!(engagement = %label, answer_len = answer.len(), "Question answered");

        response::format_response(answer, Some(label))
    }

    /// Start capturing a spoken question on a worker thread.
    ///
    /// Returns immediately. When a capture is already in flight the request
    /// is dropped and `on_result` is never called. Otherwise `on_result`
    /// runs exactly once on the worker with the transcript, or `None` when
    /// nothing usable was heard, the capture was interrupted, or the capture
    /// failed or panicked. The slot is released after `on_result` returns.
    pub fn start_voice_input<F>(&self, on_result: F) -> Result<VoiceStart, SessionError>
    where
        F: FnOnce(Option<String>) + Send + 'static,
    {
        let Some(slot) = FlagGuard::try_claim(&self.voice_slot) else {
            tracing::debug!("Voice capture already in progress, request dropped");
            return Ok(VoiceStart::Busy);
        };
        self.cancel.reset();

        let voice = Arc::clone(&self.voice);
        let cancel = self.cancel.clone();
        std::thread::Builder::new()
            .name("tutor-voice-capture".to_string())
            .spawn(move || {
                let _slot = slot;
                let captured = panic::catch_unwind(AssertUnwindSafe(|| voice.capture(&cancel)));
                let transcript = match captured {
                    Ok(Ok(transcript)) => transcript,
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Voice capture failed");
                        None
                    }
                    Err(_) => {
                        tracing::error!("Voice capture panicked");
                        None
                    }
                };
                on_result(transcript);
            })?;

        tracing::info!("Voice capture started");
        Ok(VoiceStart::Started)
    }

    /// Ask the in-flight capture to stop at its next check. Harmless when idle.
    pub fn interrupt(&self) {
        self.cancel.cancel();
        tracing::info!("Voice capture interrupt requested");
    }

    /// Forget the conversation so far.
    ///
    /// Engagement tracking is untouched: the classifier keeps its last label
    /// and history.
    pub fn clear_conversation(&self) {
        self.generator.clear_memory();
        self.lock_state().reset_engagement();
        tracing::info!("Conversation cleared");
    }

    pub fn status(&self) -> SessionStatus {
        let processing = self.processing.load(Ordering::Acquire);
        let listening = self.voice_slot.load(Ordering::Acquire);
        let state = self.lock_state();
        SessionStatus {
            session_id: state.id,
            started_at: state.started_at,
            phase: SessionPhase::from_flags(processing, listening),
            processing,
            listening,
            last_engagement: state.last_engagement,
            questions_answered: state.questions_answered,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Tests
// =============================================================================
