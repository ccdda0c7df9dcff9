use crate::config::Config;
use crate::session::SessionController;
use crate::tutor::TutorService;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionController,
    pub tutor: TutorService,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SessionController {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for TutorService {
    fn from_ref(state: &AppState) -> Self {
        state.tutor.clone()
    }
}
