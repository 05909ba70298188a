//! Prompt assembly.

use crate::context::Turn;

/// Build the model prompt: system instruction, prior turns, then the question.
pub fn build_prompt<'a>(
    system_prompt: &str,
    history: impl IntoIterator<Item = &'a Turn>,
    question: &str,
) -> String {
    let mut prompt = String::from(system_prompt.trim());
    for turn in history {
        prompt.push_str("\nStudent: ");
        prompt.push_str(&turn.question);
        prompt.push_str("\nAssistant: ");
        prompt.push_str(&turn.answer);
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(question.trim());
    prompt
}
