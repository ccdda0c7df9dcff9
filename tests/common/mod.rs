// tests/common/mod.rs

#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tutor_backend::{
    config::{Config, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL},
    error::AppError,
    models::{
        quiz::{AttemptResult, OptionLetter, Question, QuestionOutcome, Quiz, QuizAttempt, QuizKind},
        tutor::ChatExchange,
    },
    routes,
    session::SessionController,
    state::AppState,
    store::{ActivityLog, AttemptStore, ChatHistory},
    tutor::{CompletionClient, TutorService},
    utils::jwt::sign_jwt,
};

pub const SECRET: &str = "test_secret_for_integration_tests";
pub const STUDENT: &str = "student-1";
pub const OTHER_STUDENT: &str = "student-2";

/// Builds a quiz whose question ids are `quiz_id * 100 + index + 1`.
pub fn quiz(quiz_id: i64, kind: &str, correct: &[OptionLetter], max_score: i64) -> Quiz {
    Quiz {
        id: quiz_id,
        subject: "Mathematics".to_string(),
        chapter: Some("Fractions".to_string()),
        questions: correct
            .iter()
            .enumerate()
            .map(|(i, letter)| Question {
                id: quiz_id * 100 + i as i64 + 1,
                text: format!("Question {}", i + 1),
                options: [
                    "first".to_string(),
                    "second".to_string(),
                    "third".to_string(),
                    "fourth".to_string(),
                ],
                correct: *letter,
                difficulty: Some("medium".to_string()),
            })
            .collect(),
        max_score,
        kind: QuizKind::from_tag(kind),
    }
}

pub fn attempt(id: i64, quiz_id: i64, user_id: &str) -> QuizAttempt {
    QuizAttempt {
        id,
        quiz_id,
        user_id: user_id.to_string(),
        score: 0,
        answers: HashMap::new(),
        attempt_number: 1,
        completed_at: None,
    }
}

/// In-memory record store with failure switches and call counters.
#[derive(Default)]
pub struct MemoryStore {
    pub attempts: Mutex<HashMap<i64, QuizAttempt>>,
    pub quizzes: Mutex<HashMap<i64, Quiz>>,
    pub updates: Mutex<Vec<(i64, AttemptResult)>>,
    pub outcomes: Mutex<Vec<QuestionOutcome>>,
    pub fail_update: AtomicBool,
    /// Question ids whose outcome log call fails.
    pub failing_outcomes: Mutex<HashSet<i64>>,
    pub update_delay: Mutex<Option<Duration>>,
    pub log_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with(quizzes: Vec<Quiz>, attempts: Vec<QuizAttempt>) -> Arc<Self> {
        let store = Self::default();
        *store.quizzes.lock().unwrap() = quizzes.into_iter().map(|q| (q.id, q)).collect();
        *store.attempts.lock().unwrap() = attempts.into_iter().map(|a| (a.id, a)).collect();
        Arc::new(store)
    }

    pub fn update_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    pub fn last_update(&self) -> Option<(i64, AttemptResult)> {
        self.updates.lock().unwrap().last().cloned()
    }

    pub fn logged_outcomes(&self) -> Vec<QuestionOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn get_attempt(&self, id: i64, owner_id: &str) -> Result<Option<QuizAttempt>, AppError> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .get(&id)
            .filter(|a| a.user_id == owner_id)
            .cloned())
    }

    async fn get_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        Ok(self.quizzes.lock().unwrap().get(&id).cloned())
    }

    async fn update_attempt(&self, id: i64, result: &AttemptResult) -> Result<(), AppError> {
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("connection reset".to_string()));
        }
        let mut attempts = self.attempts.lock().unwrap();
        if let Some(a) = attempts.get_mut(&id) {
            if a.completed_at.is_some() {
                return Err(AppError::Conflict("already submitted".to_string()));
            }
            a.score = result.score;
            a.answers = result.answers.clone();
            a.completed_at = Some(result.completed_at);
        }
        self.updates.lock().unwrap().push((id, result.clone()));
        Ok(())
    }
}

#[async_trait]
impl ActivityLog for MemoryStore {
    async fn log_question_outcome(&self, outcome: &QuestionOutcome) -> Result<(), AppError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_outcomes.lock().unwrap().contains(&outcome.question_id) {
            return Err(AppError::Persistence("activity table unavailable".to_string()));
        }
        self.outcomes.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryChatHistory {
    pub saved: Mutex<Vec<ChatExchange>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl ChatHistory for MemoryChatHistory {
    async fn save_exchange(&self, exchange: &ChatExchange) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("chat_history unavailable".to_string()));
        }
        self.saved.lock().unwrap().push(exchange.clone());
        Ok(())
    }
}

/// Completion client that records prompts and answers with a fixed reply.
pub struct FakeCompletion {
    pub reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AppError::Upstream)
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub history: Arc<MemoryChatHistory>,
    pub completion: Arc<FakeCompletion>,
    pub sessions: SessionController,
    pub router: axum::Router,
}

/// Configuration that never reads the environment.
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/tutor_test".to_string(),
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        server_port: 0,
        gemini_api_key: None,
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        gemini_api_base: url::Url::parse(DEFAULT_GEMINI_API_BASE).unwrap(),
    }
}

pub fn spawn_app(store: Arc<MemoryStore>, completion: Arc<FakeCompletion>) -> TestApp {
    let history = Arc::new(MemoryChatHistory::default());
    let sessions = SessionController::new(store.clone(), store.clone());
    let state = AppState {
        config: test_config(),
        sessions: sessions.clone(),
        tutor: TutorService::new(completion.clone(), history.clone()),
    };

    TestApp {
        store,
        history,
        completion,
        sessions,
        router: routes::create_router(state),
    }
}

pub fn token_for(user_id: &str) -> String {
    sign_jwt(user_id, "student", SECRET, 600).expect("Failed to sign test token")
}
