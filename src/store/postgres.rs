// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};

use crate::{
    error::AppError,
    models::{
        quiz::{AttemptResult, AttemptRow, QuestionOutcome, QuestionRow, Quiz, QuizAttempt, QuizRow},
        tutor::ChatExchange,
    },
    store::{ActivityLog, AttemptStore, ChatHistory},
};

/// All store traits implemented on one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn get_attempt(&self, id: i64, owner_id: &str) -> Result<Option<QuizAttempt>, AppError> {
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, quiz_id, user_id, score, answers, attempt_number, completed_at
            FROM quiz_attempts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz attempt {}: {:?}", id, e);
            AppError::from(e)
        })?;

        row.map(QuizAttempt::try_from).transpose()
    }

    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        let quiz_row = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, subject, chapter, max_score, type
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz {}: {:?}", id, e);
            AppError::from(e)
        })?;

        let Some(quiz_row) = quiz_row else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                id,
                question_text,
                option_a,
                option_b,
                option_c,
                option_d,
                correct_answer,
                difficulty
            FROM quiz_questions
            WHERE quiz_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for quiz {}: {:?}", id, e);
            AppError::from(e)
        })?;

        quiz_row.into_quiz(questions).map(Some)
    }

    async fn update_attempt(&self, id: i64, result: &AttemptResult) -> Result<(), AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET score = $1, answers = $2, completed_at = $3
            WHERE id = $4 AND completed_at IS NULL
            "#,
        )
        .bind(result.score)
        .bind(Json(&result.answers))
        .bind(result.completed_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update quiz attempt {}: {:?}", id, e);
            AppError::from(e)
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Quiz attempt {} no longer exists or was already submitted",
                id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ActivityLog for PgStore {
    async fn log_question_outcome(&self, outcome: &QuestionOutcome) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO question_activity
                (attempt_id, question_id, question_text, student_answer, correct_answer, is_correct)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(outcome.attempt_id)
        .bind(outcome.question_id)
        .bind(&outcome.question_text)
        .bind(&outcome.student_answer)
        .bind(&outcome.correct_answer)
        .bind(outcome.is_correct)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ChatHistory for PgStore {
    async fn save_exchange(&self, exchange: &ChatExchange) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO chat_history (user_id, subject, chapter, question, answer)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&exchange.user_id)
        .bind(&exchange.subject)
        .bind(&exchange.chapter)
        .bind(&exchange.question)
        .bind(&exchange.answer)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
