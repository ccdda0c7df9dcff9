// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Countdown budget for a single quiz session, in seconds.
pub const QUIZ_TIME_LIMIT_SECS: u32 = 1800;

/// Points per correct answer on a "daily" quiz.
pub const DAILY_POINTS: i64 = 25;

/// Points per correct answer on every other quiz type.
pub const STANDARD_POINTS: i64 = 8;

/// Where the client is sent when a session ends.
pub const QUIZ_LIST_PATH: &str = "/quizzes";

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub server_port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: Url,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let gemini_model = env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let gemini_api_base = env::var("GEMINI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string());
        let gemini_api_base = Url::parse(&gemini_api_base)
            .expect("GEMINI_API_BASE must be a valid URL");

        Self {
            database_url,
            jwt_secret,
            rust_log,
            server_port,
            gemini_api_key,
            gemini_model,
            gemini_api_base,
        }
    }
}
