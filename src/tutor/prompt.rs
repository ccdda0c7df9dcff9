// src/tutor/prompt.rs

pub const DEFAULT_SUBJECT: &str = "General";
pub const DEFAULT_CHAPTER: &str = "General";

/// Renders the instructional prompt sent with every student question.
pub fn build_prompt(subject: &str, chapter: &str, question: &str) -> String {
    format!(
        "You are an expert and patient tutor helping a school student.\n\
         Subject: {subject}\n\
         Chapter: {chapter}\n\
         \n\
         Answer the student's question below. Explain the idea step by step in \
         simple language, use a short example where it helps, and stay within \
         the scope of the subject and chapter. If the question is unrelated to \
         studying, politely steer the student back to the topic. Keep the answer \
         under 300 words.\n\
         \n\
         Student's question: {question}"
    )
}

/// Uses the provided value unless it is missing or blank.
pub fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}
