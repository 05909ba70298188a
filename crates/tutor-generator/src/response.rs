//! Post-processing of raw model output.
//!
//! Decides whether a completion is usable and shapes it into a sentence;
//! otherwise substitutes a fallback that asks the student to rephrase.

/// Minimum number of words in an acceptable answer.
pub const MIN_ANSWER_WORDS: usize = 3;

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `answer` is too poor to show: empty, the bare word "explain", a
/// case-insensitive echo of the question, or shorter than three words.
pub fn is_degenerate(answer: &str, question: &str) -> bool {
    let lowered = answer.to_lowercase();
    lowered.is_empty()
        || lowered == "explain"
        || lowered == question.trim().to_lowercase()
        || answer.split_whitespace().count() < MIN_ANSWER_WORDS
}

/// Append a period unless the answer already ends a sentence.
pub fn ensure_terminal_punctuation(mut answer: String) -> String {
    if !answer.ends_with(['.', '!', '?']) {
        answer.push('.');
    }
    answer
}

/// Safe substitute text for a degenerate or failed generation.
pub fn fallback_response(question: &str) -> String {
    let question = question.trim();
    if question.is_empty() {
        "I'm still learning. Could you ask in a different way?".to_string()
    } else {
        format!(
            "I'm thinking about your question: '{}'. Could you rephrase it?",
            question
        )
    }
}
