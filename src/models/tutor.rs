// src/models/tutor.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO for a student question sent to the tutor.
/// `question` is optional here so that a missing field is reported as a
/// validation error instead of a body rejection.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(max = 4000))]
    pub question: Option<String>,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    #[validate(length(max = 100))]
    pub chapter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// One question/answer pair, stored in 'chat_history'.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub user_id: String,
    pub subject: String,
    pub chapter: String,
    pub question: String,
    pub answer: String,
}
