// src/tutor/mod.rs

pub mod gemini;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use validator::Validate;

use crate::{
    error::AppError,
    models::tutor::{AskRequest, AskResponse, ChatExchange},
    store::ChatHistory,
    utils::{html::clean_html, jwt::Claims},
};

pub use gemini::GeminiClient;

/// External text-completion service.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

/// Forwards student questions to the completion service.
#[derive(Clone)]
pub struct TutorService {
    client: Arc<dyn CompletionClient>,
    history: Arc<dyn ChatHistory>,
}

impl TutorService {
    pub fn new(client: Arc<dyn CompletionClient>, history: Arc<dyn ChatHistory>) -> Self {
        Self { client, history }
    }

    /// Validates the request, makes exactly one completion call and returns
    /// the sanitised answer. When `user` is known the exchange is saved;
    /// a failed save is logged and otherwise ignored.
    pub async fn ask(&self, req: AskRequest, user: Option<&Claims>) -> Result<AskResponse, AppError> {
        req.validate()?;

        let question = req
            .question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("Question is required".to_string()))?;
        let subject = prompt::or_default(req.subject.as_deref(), prompt::DEFAULT_SUBJECT);
        let chapter = prompt::or_default(req.chapter.as_deref(), prompt::DEFAULT_CHAPTER);

        let raw = self
            .client
            .complete(&prompt::build_prompt(subject, chapter, question))
            .await?;
        let answer = clean_html(&raw);

        if let Some(claims) = user {
            let exchange = ChatExchange {
                user_id: claims.sub.clone(),
                subject: subject.to_string(),
                chapter: chapter.to_string(),
                question: question.to_string(),
                answer: answer.clone(),
            };
            if let Err(e) = self.history.save_exchange(&exchange).await {
                tracing::warn!("Failed to save chat history for {}: {}", claims.sub, e);
            }
        }

        Ok(AskResponse { answer })
    }
}
