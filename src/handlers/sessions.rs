// src/handlers/sessions.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::session::{SelectAnswerRequest, StartSessionRequest},
    session::{SessionController, SubmitTrigger},
    utils::jwt::Claims,
};

/// Opens a quiz session on an attempt owned by the caller.
///
/// * Validates the token and extracts the user id.
/// * Loads the attempt and its quiz, resets answers and the countdown.
/// * Returns 201 Created and the first question.
pub async fn start_session(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::from(e).leave_session())?;
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()).leave_session());
    }

    let view = sessions.load_attempt(req.attempt_id, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_session(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions.view(attempt_id, &claims.sub).await?;
    Ok(Json(view))
}

/// Records the student's choice for one question (A-D).
pub async fn select_answer(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
    payload: Result<Json<SelectAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let view = sessions
        .select_answer(attempt_id, &claims.sub, req.question_id, &req.answer)
        .await?;
    Ok(Json(view))
}

pub async fn next_question(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions.advance(attempt_id, &claims.sub).await?;
    Ok(Json(view))
}

pub async fn previous_question(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = sessions.retreat(attempt_id, &claims.sub).await?;
    Ok(Json(view))
}

/// Submits the attempt from the last question.
///
/// Returns the score out of the quiz maximum and where to go next.
/// A second submit while the first is still running gets 409.
pub async fn submit_session(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = sessions
        .submit(attempt_id, &claims.sub, SubmitTrigger::User)
        .await?;
    Ok(Json(receipt))
}

/// Leaves the quiz page without submitting.
pub async fn abandon_session(
    State(sessions): State<SessionController>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sessions.abandon(attempt_id, &claims.sub).await?;
    Ok(StatusCode::NO_CONTENT)
}
