// src/session/state.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{
        quiz::{AttemptResult, OptionLetter, Question, QuestionOutcome, Quiz, QuizAttempt},
        session::SessionView,
    },
    session::scoring::{compute_score, count_correct, question_outcomes},
};

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Ready,
    Submitting,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Loaded,
    LoadFailed,
    SubmitRequested,
    SubmitFinished,
    Abandoned,
}

impl Phase {
    /// Transition function. Events that do not apply to the current phase
    /// leave it unchanged.
    pub fn on(self, event: PhaseEvent) -> Phase {
        match (self, event) {
            (Phase::Loading, PhaseEvent::Loaded) => Phase::Ready,
            (Phase::Loading, PhaseEvent::LoadFailed) => Phase::Terminated,
            (Phase::Ready, PhaseEvent::SubmitRequested) => Phase::Submitting,
            (Phase::Submitting, PhaseEvent::SubmitFinished) => Phase::Terminated,
            // An in-flight submission always runs to completion.
            (Phase::Loading | Phase::Ready, PhaseEvent::Abandoned) => Phase::Terminated,
            (phase, _) => phase,
        }
    }
}

/// Result of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    /// The countdown just reached zero. Reported once per session.
    Expired,
    /// The session is not `Ready`; the countdown should stop.
    Idle,
}

/// What started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    User,
    Timer,
}

/// Everything the submit sequence needs once the session has left `Ready`.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub attempt_id: i64,
    pub result: AttemptResult,
    pub outcomes: Vec<QuestionOutcome>,
    pub correct_count: usize,
    pub total_questions: usize,
    pub max_score: i64,
}

/// In-memory state of one quiz attempt. Pure: no I/O, no clock, no timers.
#[derive(Debug, Clone)]
pub struct Session {
    attempt_id: i64,
    attempt_number: i32,
    user_id: String,
    quiz: Quiz,
    phase: Phase,
    cursor: usize,
    selections: HashMap<i64, OptionLetter>,
    remaining_secs: u32,
    expired: bool,
}

impl Session {
    /// Builds a `Ready` session from a fetched attempt and its quiz.
    /// Selections start empty and the countdown starts at `time_limit_secs`.
    pub fn loaded(attempt: &QuizAttempt, quiz: Quiz, time_limit_secs: u32) -> Result<Self, AppError> {
        if quiz.questions.is_empty() {
            return Err(AppError::NotFound(format!("Quiz {} has no questions", quiz.id)));
        }

        Ok(Self {
            attempt_id: attempt.id,
            attempt_number: attempt.attempt_number,
            user_id: attempt.user_id.clone(),
            quiz,
            phase: Phase::Loading.on(PhaseEvent::Loaded),
            cursor: 0,
            selections: HashMap::new(),
            remaining_secs: time_limit_secs,
            expired: false,
        })
    }

    pub fn attempt_id(&self) -> i64 {
        self.attempt_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn selections(&self) -> &HashMap<i64, OptionLetter> {
        &self.selections
    }

    pub fn current_question(&self) -> &Question {
        // Non-empty is checked in `loaded`.
        &self.quiz.questions[self.cursor]
    }

    pub fn is_on_last_question(&self) -> bool {
        self.cursor + 1 == self.quiz.questions.len()
    }

    fn ensure_ready(&self) -> Result<(), AppError> {
        match self.phase {
            Phase::Ready if self.expired => {
                Err(AppError::Conflict("Time is up for this quiz".to_string()))
            }
            Phase::Ready => Ok(()),
            _ => Err(AppError::Conflict("This quiz session is no longer active".to_string())),
        }
    }

    /// Records `letter` for `question_id`, replacing any earlier choice.
    pub fn select_answer(&mut self, question_id: i64, letter: OptionLetter) -> Result<(), AppError> {
        self.ensure_ready()?;
        if !self.quiz.contains_question(question_id) {
            return Err(AppError::BadRequest(format!(
                "Question {} is not part of this quiz",
                question_id
            )));
        }
        self.selections.insert(question_id, letter);
        Ok(())
    }

    /// Moves to the next question. Returns `false` at the last question.
    pub fn advance(&mut self) -> bool {
        if self.ensure_ready().is_err() || self.is_on_last_question() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Moves to the previous question. Returns `false` at the first question.
    pub fn retreat(&mut self) -> bool {
        if self.ensure_ready().is_err() || self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::Ready || self.expired {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            Tick::Expired
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    /// Leaves `Ready` and freezes the score. Fails without side effects if a
    /// submission already started, or if a user submits before the last question.
    pub fn begin_submit(
        &mut self,
        trigger: SubmitTrigger,
        completed_at: DateTime<Utc>,
    ) -> Result<PendingSubmission, AppError> {
        match self.phase {
            Phase::Ready => {}
            Phase::Submitting => {
                return Err(AppError::Conflict(
                    "This quiz is already being submitted".to_string(),
                ));
            }
            Phase::Loading | Phase::Terminated => {
                return Err(AppError::Conflict("This quiz session is no longer active".to_string()));
            }
        }
        if trigger == SubmitTrigger::User && !self.is_on_last_question() {
            return Err(AppError::BadRequest(
                "The quiz can only be submitted from the last question".to_string(),
            ));
        }

        self.phase = self.phase.on(PhaseEvent::SubmitRequested);

        Ok(PendingSubmission {
            attempt_id: self.attempt_id,
            result: AttemptResult {
                score: compute_score(&self.quiz, &self.selections),
                answers: self.selections.clone(),
                completed_at,
            },
            outcomes: question_outcomes(self.attempt_id, &self.quiz, &self.selections),
            correct_count: count_correct(&self.quiz, &self.selections),
            total_questions: self.quiz.questions.len(),
            max_score: self.quiz.max_score,
        })
    }

    pub fn finish_submit(&mut self) {
        self.phase = self.phase.on(PhaseEvent::SubmitFinished);
    }

    pub fn abandon(&mut self) {
        self.phase = self.phase.on(PhaseEvent::Abandoned);
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            attempt_id: self.attempt_id,
            attempt_number: self.attempt_number,
            quiz_id: self.quiz.id,
            subject: self.quiz.subject.clone(),
            chapter: self.quiz.chapter.clone(),
            quiz_type: self.quiz.kind.as_tag().to_string(),
            max_score: self.quiz.max_score,
            phase: self.phase,
            current_index: self.cursor,
            total_questions: self.quiz.questions.len(),
            question: self.current_question().into(),
            selections: self.selections.clone(),
            remaining_secs: self.remaining_secs,
        }
    }
}
