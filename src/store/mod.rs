// src/store/mod.rs

//! Collaborators backed by the hosted database.
//!
//! Handlers and the session controller only see these traits; the
//! PostgreSQL implementation lives in [`postgres`].

pub mod postgres;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        quiz::{AttemptResult, QuestionOutcome, Quiz, QuizAttempt},
        tutor::ChatExchange,
    },
};

pub use postgres::PgStore;

/// Read/update access to quiz attempts and quizzes.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Returns the attempt only if it is owned by `owner_id`.
    async fn get_attempt(&self, id: i64, owner_id: &str) -> Result<Option<QuizAttempt>, AppError>;

    /// Returns the quiz with its questions in display order.
    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError>;

    /// Writes score, answers and completion time in a single statement.
    /// An attempt that is already completed is never overwritten.
    async fn update_attempt(&self, id: i64, result: &AttemptResult) -> Result<(), AppError>;
}

/// Per-question outcome log, used by analytics outside this service.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn log_question_outcome(&self, outcome: &QuestionOutcome) -> Result<(), AppError>;
}

/// Saved tutor conversations.
#[async_trait]
pub trait ChatHistory: Send + Sync {
    async fn save_exchange(&self, exchange: &ChatExchange) -> Result<(), AppError>;
}
