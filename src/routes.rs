// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{sessions, tutor},
    state::AppState,
    utils::jwt::auth_middleware,
};

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Assembles the main application router.
///
/// * Merges all sub-routers (sessions, tutor).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (session controller, tutor, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Every session route needs an identity-provider token.
    let session_routes = Router::new()
        .route("/api/sessions", post(sessions::start_session))
        .route(
            "/api/sessions/{attempt_id}",
            get(sessions::get_session).delete(sessions::abandon_session),
        )
        .route("/api/sessions/{attempt_id}/answers", put(sessions::select_answer))
        .route("/api/sessions/{attempt_id}/next", post(sessions::next_question))
        .route(
            "/api/sessions/{attempt_id}/previous",
            post(sessions::previous_question),
        )
        .route("/api/sessions/{attempt_id}/submit", post(sessions::submit_session))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Token is optional here; it only decides whether the exchange is saved.
    let tutor_routes = Router::new().route("/api/tutor/ask", post(tutor::ask));

    Router::new()
        .route("/api/health", get(health))
        .merge(session_routes)
        .merge(tutor_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
