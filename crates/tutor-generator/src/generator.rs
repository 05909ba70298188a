//! Reference response generator wrapping a text model.

use std::sync::{Mutex, PoisonError};

use tutor_core::config::GeneratorConfig;

use crate::context::{ConversationMemory, Turn};
use crate::error::GeneratorError;
use crate::prompt::build_prompt;
use crate::response::{
    ensure_terminal_punctuation, fallback_response, is_degenerate, normalize_whitespace,
};
use crate::{GenerationParams, ResponseGenerator, TextModel};

/// Answers questions with a `TextModel`, keeping a short conversation memory.
///
/// Poor completions and model errors both come back as a fallback string
/// asking the student to rephrase. Only an unloaded model is an error.
pub struct TutorGenerator<M> {
    model: M,
    system_prompt: String,
    params: GenerationParams,
    memory: Mutex<ConversationMemory>,
}

impl<M> std::fmt::Debug for TutorGenerator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorGenerator")
            .field("params", &self.params)
            .field("memory_turns", &self.memory_len())
            .finish_non_exhaustive()
    }
}

impl<M> TutorGenerator<M> {
    /// Number of turns currently remembered.
    pub fn memory_len(&self) -> usize {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copy of the remembered turns, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .turns()
            .cloned()
            .collect()
    }
}

impl<M: TextModel> TutorGenerator<M> {
    pub fn new(model: M, config: &GeneratorConfig) -> Self {
        Self {
            model,
            system_prompt: config.system_prompt.clone(),
            params: GenerationParams::from(config),
            memory: Mutex::new(ConversationMemory::new(config.max_history)),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }
}

impl<M: TextModel> ResponseGenerator for TutorGenerator<M> {
    fn generate(&self, question: &str) -> Result<String, GeneratorError> {
        if !self.model.is_ready() {
            return Err(GeneratorError::NotReady);
        }

        let prompt = {
            let memory = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
            build_prompt(&self.system_prompt, memory.turns(), question)
        };
        tracing::debug!(prompt_len = prompt.len(), "Prompt sent to model");

        let raw = match self.model.complete(&prompt, &self.params) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "Response generation error");
                return Ok(fallback_response(question));
            }
        };

        let cleaned = normalize_whitespace(&raw);
        tracing::debug!(raw_len = raw.len(), cleaned_len = cleaned.len(), "Raw model output");

        if is_degenerate(&cleaned, question) {
            tracing::info!("Degenerate model output, using fallback");
            return Ok(fallback_response(question));
        }

        let answer = ensure_terminal_punctuation(cleaned);
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Turn::new(question.trim(), answer.clone()));
        Ok(answer)
    }

    fn clear_memory(&self) {
        self.memory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::info!("Conversation history cleared");
    }
}
