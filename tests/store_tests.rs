// tests/store_tests.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tutor_backend::{
    error::AppError,
    models::{
        quiz::{AttemptResult, OptionLetter, QuestionOutcome, QuizKind},
        tutor::ChatExchange,
    },
    store::{ActivityLog, AttemptStore, ChatHistory, PgStore},
};

/// Connects to the database named by DATABASE_URL and runs migrations.
/// Returns `None` when no database is configured so the suite can run offline.
async fn connect() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(pool)
}

/// Seeds a two-question daily quiz and one attempt; returns (quiz_id, attempt_id, owner).
async fn seed(pool: &PgPool) -> (i64, i64, String) {
    let owner = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let (quiz_id,): (i64,) = sqlx::query_as(
        "INSERT INTO quizzes (subject, chapter, max_score, type) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Science")
    .bind("Plants")
    .bind(50_i64)
    .bind("daily")
    .fetch_one(pool)
    .await
    .unwrap();

    // Inserted out of order to check that `position` decides the order.
    for (position, text, correct) in [(1, "Second", "C"), (0, "First", "A")] {
        sqlx::query(
            r#"
            INSERT INTO quiz_questions
                (quiz_id, position, question_text, option_a, option_b, option_c, option_d, correct_answer)
            VALUES ($1, $2, $3, 'a', 'b', 'c', 'd', $4)
            "#,
        )
        .bind(quiz_id)
        .bind(position)
        .bind(text)
        .bind(correct)
        .execute(pool)
        .await
        .unwrap();
    }

    let (attempt_id,): (i64,) = sqlx::query_as(
        "INSERT INTO quiz_attempts (quiz_id, user_id, attempt_number) VALUES ($1, $2, 1) RETURNING id",
    )
    .bind(quiz_id)
    .bind(&owner)
    .fetch_one(pool)
    .await
    .unwrap();

    (quiz_id, attempt_id, owner)
}

#[tokio::test]
async fn attempt_and_quiz_round_trip() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool.clone());
    let (quiz_id, attempt_id, owner) = seed(&pool).await;

    assert!(store.get_attempt(attempt_id, "someone-else").await.unwrap().is_none());

    let attempt = store.get_attempt(attempt_id, &owner).await.unwrap().unwrap();
    assert_eq!(attempt.quiz_id, quiz_id);
    assert!(attempt.answers.is_empty());
    assert!(attempt.completed_at.is_none());

    let quiz = store.get_quiz(quiz_id).await.unwrap().unwrap();
    assert_eq!(quiz.kind, QuizKind::Daily);
    assert_eq!(quiz.questions.len(), 2);
    assert_eq!(quiz.questions[0].text, "First");
    assert_eq!(quiz.questions[1].correct, OptionLetter::C);

    let first_id = quiz.questions[0].id;
    store
        .update_attempt(
            attempt_id,
            &AttemptResult {
                score: 25,
                answers: HashMap::from([(first_id, OptionLetter::A)]),
                completed_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    let attempt = store.get_attempt(attempt_id, &owner).await.unwrap().unwrap();
    assert_eq!(attempt.score, 25);
    assert_eq!(attempt.answers[&first_id], OptionLetter::A);
    assert!(attempt.completed_at.is_some());
}

#[tokio::test]
async fn completed_attempt_is_not_overwritten() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool.clone());
    let (_, attempt_id, owner) = seed(&pool).await;

    let result = |score| AttemptResult {
        score,
        answers: HashMap::new(),
        completed_at: Utc::now(),
    };
    store.update_attempt(attempt_id, &result(25)).await.unwrap();

    let err = store.update_attempt(attempt_id, &result(50)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let attempt = store.get_attempt(attempt_id, &owner).await.unwrap().unwrap();
    assert_eq!(attempt.score, 25);
}

#[tokio::test]
async fn update_of_missing_attempt_fails() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool);

    let result = store
        .update_attempt(
            i64::MAX,
            &AttemptResult {
                score: 0,
                answers: HashMap::new(),
                completed_at: Utc::now(),
            },
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn outcome_and_chat_logs_are_written() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool.clone());
    let (_, attempt_id, owner) = seed(&pool).await;

    store
        .log_question_outcome(&QuestionOutcome {
            attempt_id,
            question_id: 1,
            question_text: "First".to_string(),
            student_answer: String::new(),
            correct_answer: "A".to_string(),
            is_correct: false,
        })
        .await
        .unwrap();

    store
        .save_exchange(&ChatExchange {
            user_id: owner.clone(),
            subject: "Science".to_string(),
            chapter: "Plants".to_string(),
            question: "Why are leaves green?".to_string(),
            answer: "Chlorophyll.".to_string(),
        })
        .await
        .unwrap();

    let (logged,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM question_activity WHERE attempt_id = $1")
            .bind(attempt_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(logged, 1);

    let (saved,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_history WHERE user_id = $1")
        .bind(&owner)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(saved, 1);
}
