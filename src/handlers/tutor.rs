// src/handlers/tutor.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::IntoResponse,
};

use crate::{
    config::Config,
    error::AppError,
    models::tutor::AskRequest,
    tutor::TutorService,
    utils::jwt::claims_from_headers,
};

/// Answers a student question through the completion service.
///
/// The token is optional; when it resolves to a user the exchange is saved.
pub async fn ask(
    State(tutor): State<TutorService>,
    State(config): State<Config>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let claims = claims_from_headers(&headers, &config.jwt_secret);
    let response = tutor.ask(req, claims.as_ref()).await?;
    Ok(Json(response))
}
