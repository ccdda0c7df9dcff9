// src/session/scoring.rs

use std::collections::HashMap;

use crate::models::quiz::{OptionLetter, QuestionOutcome, Quiz};

/// Number of questions whose recorded selection equals the correct option.
/// Selections for ids outside the quiz are ignored.
pub fn count_correct(quiz: &Quiz, selections: &HashMap<i64, OptionLetter>) -> usize {
    quiz.questions
        .iter()
        .filter(|q| selections.get(&q.id) == Some(&q.correct))
        .count()
}

/// Flat scoring: every exact match is worth the quiz type's per-question
/// points, everything else is worth zero.
pub fn compute_score(quiz: &Quiz, selections: &HashMap<i64, OptionLetter>) -> i64 {
    count_correct(quiz, selections) as i64 * quiz.kind.points_per_question()
}

/// One outcome per quiz question, in quiz order.
pub fn question_outcomes(
    attempt_id: i64,
    quiz: &Quiz,
    selections: &HashMap<i64, OptionLetter>,
) -> Vec<QuestionOutcome> {
    quiz.questions
        .iter()
        .map(|q| {
            let chosen = selections.get(&q.id);
            QuestionOutcome {
                attempt_id,
                question_id: q.id,
                question_text: q.text.clone(),
                student_answer: chosen.map(|l| l.to_string()).unwrap_or_default(),
                correct_answer: q.correct.to_string(),
                is_correct: chosen == Some(&q.correct),
            }
        })
        .collect()
}
