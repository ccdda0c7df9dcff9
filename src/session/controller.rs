// src/session/controller.rs

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Mutex;

use crate::{
    config::{QUIZ_LIST_PATH, QUIZ_TIME_LIMIT_SECS},
    error::AppError,
    models::{
        quiz::OptionLetter,
        session::{SessionView, SubmissionReceipt},
    },
    session::{
        countdown::Countdown,
        state::{PendingSubmission, Phase, Session, SubmitTrigger, Tick},
    },
    store::{ActivityLog, AttemptStore},
};

/// A session plus the countdown that belongs to it.
struct Slot {
    session: Session,
    countdown: Option<Countdown>,
}

/// One registered session, shared between request handlers and its countdown.
pub struct LiveSession {
    slot: Mutex<Slot>,
}

type Registry = Arc<Mutex<HashMap<i64, Arc<LiveSession>>>>;

/// Drives quiz sessions: loading, navigation, the countdown and submission.
///
/// Live sessions are keyed by attempt id. The session mutex is never held
/// while talking to the store.
#[derive(Clone)]
pub struct SessionController {
    store: Arc<dyn AttemptStore>,
    activity: Arc<dyn ActivityLog>,
    sessions: Registry,
    time_limit_secs: u32,
    tick_period: Duration,
}

impl SessionController {
    pub fn new(store: Arc<dyn AttemptStore>, activity: Arc<dyn ActivityLog>) -> Self {
        Self {
            store,
            activity,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            time_limit_secs: QUIZ_TIME_LIMIT_SECS,
            tick_period: Duration::from_secs(1),
        }
    }

    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Number of sessions currently registered.
    pub async fn live_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Fetches the attempt and its quiz, then opens a fresh `Ready` session
    /// with an empty selection and a full countdown.
    ///
    /// Reloading an attempt that is still `Ready` replaces the old session.
    pub async fn load_attempt(&self, attempt_id: i64, user_id: &str) -> Result<SessionView, AppError> {
        self.try_load(attempt_id, user_id).await.map_err(|e| {
            tracing::warn!("Failed to load quiz attempt {}: {}", attempt_id, e);
            e.leave_session()
        })
    }

    async fn try_load(&self, attempt_id: i64, user_id: &str) -> Result<SessionView, AppError> {
        if attempt_id <= 0 {
            return Err(AppError::BadRequest("Attempt id is required".to_string()));
        }
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("User id is required".to_string()));
        }

        let attempt = self
            .store
            .get_attempt(attempt_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz attempt not found".to_string()))?;

        if attempt.completed_at.is_some() {
            return Err(AppError::Conflict("This quiz attempt was already submitted".to_string()));
        }

        let quiz = self
            .store
            .get_quiz(attempt.quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        let session = Session::loaded(&attempt, quiz, self.time_limit_secs)?;
        let view = session.view();

        {
            let mut sessions = self.sessions.lock().await;
            // Retire the old session under the same locks that check its phase,
            // so no submit can start on it once the replacement is registered.
            if let Some(existing) = sessions.get(&attempt_id) {
                let mut slot = existing.slot.lock().await;
                if slot.session.phase() != Phase::Ready {
                    return Err(AppError::Conflict(
                        "This quiz attempt is already being submitted".to_string(),
                    ));
                }
                slot.session.abandon();
                slot.countdown.take();
            }

            let live = Arc::new(LiveSession {
                slot: Mutex::new(Slot {
                    session,
                    countdown: None,
                }),
            });
            let countdown = self.start_countdown(Arc::downgrade(&live));
            live.slot.lock().await.countdown = Some(countdown);
            sessions.insert(attempt_id, live);
        }

        tracing::info!(
            "Quiz session started: attempt={} quiz={} user={}",
            attempt_id,
            view.quiz_id,
            user_id
        );
        Ok(view)
    }

    fn start_countdown(&self, live: Weak<LiveSession>) -> Countdown {
        let controller = self.clone();
        Countdown::start(self.tick_period, move || {
            let live = live.clone();
            let controller = controller.clone();
            async move {
                let Some(live) = live.upgrade() else {
                    return false;
                };
                // Expiry leaves Ready in the same critical section as the tick,
                // so nothing can slip in between.
                let pending = {
                    let mut slot = live.slot.lock().await;
                    match slot.session.tick() {
                        Tick::Running(_) => return true,
                        Tick::Idle => return false,
                        Tick::Expired => slot.session.begin_submit(SubmitTrigger::Timer, Utc::now()),
                    }
                };
                match pending {
                    // Persist from a separate task: finishing the countdown
                    // aborts this one.
                    Ok(pending) => {
                        tokio::spawn(async move {
                            if let Err(e) = controller.persist(live, pending, SubmitTrigger::Timer).await {
                                tracing::warn!("Automatic submission failed: {}", e);
                            }
                        });
                    }
                    Err(e) => tracing::warn!("Automatic submission refused: {}", e),
                }
                false
            }
        })
    }

    async fn find(&self, attempt_id: i64, user_id: &str) -> Result<Arc<LiveSession>, AppError> {
        let live = self
            .sessions
            .lock()
            .await
            .get(&attempt_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("No active session for this attempt".to_string()))?;

        if live.slot.lock().await.session.user_id() != user_id {
            return Err(AppError::NotFound("No active session for this attempt".to_string()));
        }
        Ok(live)
    }

    pub async fn view(&self, attempt_id: i64, user_id: &str) -> Result<SessionView, AppError> {
        let live = self.find(attempt_id, user_id).await?;
        let slot = live.slot.lock().await;
        Ok(slot.session.view())
    }

    pub async fn select_answer(
        &self,
        attempt_id: i64,
        user_id: &str,
        question_id: i64,
        answer: &str,
    ) -> Result<SessionView, AppError> {
        let letter = answer.parse::<OptionLetter>()?;
        let live = self.find(attempt_id, user_id).await?;
        let mut slot = live.slot.lock().await;
        slot.session.select_answer(question_id, letter)?;
        Ok(slot.session.view())
    }

    pub async fn advance(&self, attempt_id: i64, user_id: &str) -> Result<SessionView, AppError> {
        let live = self.find(attempt_id, user_id).await?;
        let mut slot = live.slot.lock().await;
        slot.session.advance();
        Ok(slot.session.view())
    }

    pub async fn retreat(&self, attempt_id: i64, user_id: &str) -> Result<SessionView, AppError> {
        let live = self.find(attempt_id, user_id).await?;
        let mut slot = live.slot.lock().await;
        slot.session.retreat();
        Ok(slot.session.view())
    }

    /// User-initiated submission.
    pub async fn submit(
        &self,
        attempt_id: i64,
        user_id: &str,
        trigger: SubmitTrigger,
    ) -> Result<SubmissionReceipt, AppError> {
        let live = self.find(attempt_id, user_id).await?;
        self.submit_live(live, trigger).await
    }

    /// The submit sequence. Runs at most once per session: a second call
    /// while the first is in flight fails with `Conflict` and writes nothing.
    async fn submit_live(
        &self,
        live: Arc<LiveSession>,
        trigger: SubmitTrigger,
    ) -> Result<SubmissionReceipt, AppError> {
        let pending = {
            let mut slot = live.slot.lock().await;
            let pending = slot.session.begin_submit(trigger, Utc::now())?;
            // Leaving Ready: stop the countdown.
            slot.countdown.take();
            pending
        };
        self.persist(live, pending, trigger).await
    }

    /// Writes the score, then the per-question outcomes, then closes the session.
    async fn persist(
        &self,
        live: Arc<LiveSession>,
        pending: PendingSubmission,
        trigger: SubmitTrigger,
    ) -> Result<SubmissionReceipt, AppError> {
        let attempt_id = pending.attempt_id;

        if let Err(e) = self.store.update_attempt(attempt_id, &pending.result).await {
            tracing::error!("Failed to save score for attempt {}: {}", attempt_id, e);
            self.terminate(attempt_id, &live).await;
            return Err(e.leave_session());
        }

        let results = join_all(
            pending
                .outcomes
                .iter()
                .map(|outcome| self.activity.log_question_outcome(outcome)),
        )
        .await;
        for (outcome, result) in pending.outcomes.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(
                    "Failed to log outcome for attempt {} question {}: {}",
                    attempt_id,
                    outcome.question_id,
                    e
                );
            }
        }

        self.terminate(attempt_id, &live).await;

        tracing::info!(
            "Quiz submitted: attempt={} score={}/{} trigger={:?}",
            attempt_id,
            pending.result.score,
            pending.max_score,
            trigger
        );

        Ok(SubmissionReceipt {
            attempt_id,
            score: pending.result.score,
            max_score: pending.max_score,
            correct_count: pending.correct_count,
            total_questions: pending.total_questions,
            message: format!(
                "Quiz submitted! Score: {}/{}",
                pending.result.score, pending.max_score
            ),
            redirect: QUIZ_LIST_PATH.to_string(),
        })
    }

    /// Marks the submission finished and unregisters the session if it is
    /// still the registered one.
    async fn terminate(&self, attempt_id: i64, live: &Arc<LiveSession>) {
        {
            let mut slot = live.slot.lock().await;
            slot.session.finish_submit();
            slot.countdown.take();
        }

        let mut sessions = self.sessions.lock().await;
        if sessions
            .get(&attempt_id)
            .is_some_and(|registered| Arc::ptr_eq(registered, live))
        {
            sessions.remove(&attempt_id);
        }
    }

    /// Tears the session down when the student leaves the page. Nothing is
    /// persisted. A submission already in flight still completes.
    pub async fn abandon(&self, attempt_id: i64, user_id: &str) -> Result<(), AppError> {
        let live = self.find(attempt_id, user_id).await?;
        {
            let mut slot = live.slot.lock().await;
            slot.session.abandon();
            slot.countdown.take();
        }

        let mut sessions = self.sessions.lock().await;
        if sessions
            .get(&attempt_id)
            .is_some_and(|registered| Arc::ptr_eq(registered, &live))
        {
            sessions.remove(&attempt_id);
        }
        tracing::info!("Quiz session abandoned: attempt={}", attempt_id);
        Ok(())
    }
}
