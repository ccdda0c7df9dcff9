// src/models/session.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::quiz::{OptionLetter, PublicQuestion},
    session::state::Phase,
};

/// DTO for opening a session on an existing attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(range(min = 1))]
    pub attempt_id: i64,
}

/// DTO for recording the student's choice on one question.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    pub question_id: i64,
    #[validate(length(min = 1, max = 1, message = "Answer must be a single option letter."))]
    pub answer: String,
}

/// Snapshot of a live session, as rendered by the quiz page.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub attempt_id: i64,
    pub attempt_number: i32,
    pub quiz_id: i64,
    pub subject: String,
    pub chapter: Option<String>,
    pub quiz_type: String,
    pub max_score: i64,
    pub phase: Phase,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: PublicQuestion,
    pub selections: HashMap<i64, OptionLetter>,
    pub remaining_secs: u32,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub attempt_id: i64,
    pub score: i64,
    pub max_score: i64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub message: String,
    pub redirect: String,
}
