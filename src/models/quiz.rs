// src/models/quiz.rs

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

use crate::{
    config::{DAILY_POINTS, STANDARD_POINTS},
    error::AppError,
};

/// Option label of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLetter::A => "A",
            OptionLetter::B => "B",
            OptionLetter::C => "C",
            OptionLetter::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLetter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(OptionLetter::A),
            "B" => Ok(OptionLetter::B),
            "C" => Ok(OptionLetter::C),
            "D" => Ok(OptionLetter::D),
            other => Err(AppError::BadRequest(format!(
                "Invalid option '{}', expected one of A, B, C, D",
                other
            ))),
        }
    }
}

/// Quiz type tag. Only "daily" changes the scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizKind {
    Daily,
    Other(String),
}

impl QuizKind {
    pub fn from_tag(tag: &str) -> Self {
        if tag == "daily" {
            QuizKind::Daily
        } else {
            QuizKind::Other(tag.to_string())
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            QuizKind::Daily => "daily",
            QuizKind::Other(tag) => tag,
        }
    }

    /// Points awarded for each exactly matching answer.
    pub fn points_per_question(&self) -> i64 {
        match self {
            QuizKind::Daily => DAILY_POINTS,
            QuizKind::Other(_) => STANDARD_POINTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: i64,
    pub text: String,
    /// Option texts, indexed A..D.
    pub options: [String; 4],
    pub correct: OptionLetter,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub id: i64,
    pub subject: String,
    pub chapter: Option<String>,
    pub questions: Vec<Question>,
    pub max_score: i64,
    pub kind: QuizKind,
}

impl Quiz {
    pub fn contains_question(&self, question_id: i64) -> bool {
        self.questions.iter().any(|q| q.id == question_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    /// Subject of the identity-provider token that owns this attempt.
    pub user_id: String,
    pub score: i64,
    pub answers: HashMap<i64, OptionLetter>,
    pub attempt_number: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Final values written to an attempt in one update call.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptResult {
    pub score: i64,
    pub answers: HashMap<i64, OptionLetter>,
    pub completed_at: DateTime<Utc>,
}

/// One row of the per-question outcome log.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionOutcome {
    pub attempt_id: i64,
    pub question_id: i64,
    pub question_text: String,
    /// Empty when the question was left unanswered.
    pub student_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub subject: String,
    pub chapter: Option<String>,
    pub max_score: i64,
    #[sqlx(rename = "type")]
    pub quiz_type: String,
}

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub difficulty: Option<String>,
}

/// Represents the 'quiz_attempts' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct AttemptRow {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: String,
    pub score: i64,
    pub answers: Json<HashMap<i64, String>>,
    pub attempt_number: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let correct = row.correct_answer.parse::<OptionLetter>().map_err(|_| {
            AppError::Persistence(format!(
                "question {} has invalid correct answer '{}'",
                row.id, row.correct_answer
            ))
        })?;

        Ok(Question {
            id: row.id,
            text: row.question_text,
            options: [row.option_a, row.option_b, row.option_c, row.option_d],
            correct,
            difficulty: row.difficulty,
        })
    }
}

impl QuizRow {
    /// Assembles a validated `Quiz` from its row and its ordered question rows.
    pub fn into_quiz(self, questions: Vec<QuestionRow>) -> Result<Quiz, AppError> {
        let questions = questions
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Quiz {
            id: self.id,
            subject: self.subject,
            chapter: self.chapter,
            questions,
            max_score: self.max_score,
            kind: QuizKind::from_tag(&self.quiz_type),
        })
    }
}

impl TryFrom<AttemptRow> for QuizAttempt {
    type Error = AppError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        let mut answers = HashMap::with_capacity(row.answers.0.len());
        for (question_id, letter) in row.answers.0 {
            let letter = letter.parse::<OptionLetter>().map_err(|_| {
                AppError::Persistence(format!(
                    "attempt {} has invalid answer '{}' for question {}",
                    row.id, letter, question_id
                ))
            })?;
            answers.insert(question_id, letter);
        }

        Ok(QuizAttempt {
            id: row.id,
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            score: row.score,
            answers,
            attempt_number: row.attempt_number,
            completed_at: row.completed_at,
        })
    }
}

/// DTO for sending a question to the client (excludes the correct answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<PublicOption>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub letter: OptionLetter,
    pub text: String,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id,
            text: q.text.clone(),
            options: OptionLetter::ALL
                .iter()
                .zip(q.options.iter())
                .map(|(letter, text)| PublicOption {
                    letter: *letter,
                    text: text.clone(),
                })
                .collect(),
            difficulty: q.difficulty.clone(),
        }
    }
}
