//! Tutor Generator crate - answer generation for student questions.
//!
//! Defines the `ResponseGenerator` boundary the session controller calls,
//! the `TextModel` boundary for the underlying decoding engine, and
//! `TutorGenerator`, which builds prompts from conversation memory and
//! substitutes fallback text for unusable completions.

pub mod context;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod response;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tutor_core::config::GeneratorConfig;

pub use context::{ConversationMemory, Turn};
pub use error::GeneratorError;
pub use generator::TutorGenerator;
pub use response::fallback_response;

// =============================================================================
// Configuration
// =============================================================================

/// Decoding parameters handed to the text model.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for GenerationParams {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
            do_sample: config.do_sample,
        }
    }
}

// =============================================================================
// Traits
// =============================================================================

/// Produces an answer for a student question.
///
/// Implementations own their conversation memory. A returned string may be
/// a fallback message; `Err` means generation could not run at all.
pub trait ResponseGenerator: Send + Sync {
    fn generate(&self, question: &str) -> Result<String, GeneratorError>;

    /// Forget all remembered turns.
    fn clear_memory(&self);
}

/// Text-generation model that completes a prompt.
pub trait TextModel: Send + Sync {
    /// Whether the model weights are loaded.
    fn is_ready(&self) -> bool {
        true
    }

    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, GeneratorError>;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Mock text model for testing and headless runs.
///
/// Replies with a canned string (or an explanation template built from the
/// question) and records the prompts it receives.
#[derive(Debug, Default)]
pub struct MockTextModel {
    reply: Option<String>,
    fail: bool,
    unloaded: bool,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    last_params: Mutex<Option<GenerationParams>>,
}

impl MockTextModel {
    /// Answers with a generic explanation of the question.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers with `reply`.
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    /// Every completion fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Reports that its weights never loaded.
    pub fn unloaded() -> Self {
        Self {
            unloaded: true,
            ..Self::default()
        }
    }

    /// Number of completions requested.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_params(&self) -> Option<GenerationParams> {
        self.last_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TextModel for MockTextModel {
    fn is_ready(&self) -> bool {
        !self.unloaded
    }

    fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(prompt.to_string());
        *self
            .last_params
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(params.clone());

        if self.fail {
            return Err(GeneratorError::Model("mock model failure".to_string()));
        }
        if let Some(ref reply) = self.reply {
            return Ok(reply.clone());
        }

        let question = prompt
            .rsplit_once("Question: ")
            .map(|(_, q)| q)
            .unwrap_or(prompt);
        Ok(format!(
            "Here is a simple way to think about it: {} Break it into smaller ideas and try an example",
            question
        ))
    }
}
