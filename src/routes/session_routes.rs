//! Session status endpoint.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::session::{now_millis, SessionFailure};
use crate::state::AppState;

/// Registers session routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/session", get(session_status))
}

/// Public view of the session. The access token itself is never exposed.
#[derive(Serialize)]
struct SessionView {
    ready: bool,
    error: bool,
    status: Option<u16>,
    failure: Option<SessionFailure>,
    expires_at: i64,
    language: Option<String>,
}

async fn session_status(State(state): State<AppState>) -> Json<SessionView> {
    let snapshot = state.session.get_snapshot();
    Json(SessionView {
        ready: snapshot.is_ready(now_millis()),
        error: snapshot.error,
        status: snapshot.status,
        failure: snapshot.failure(),
        expires_at: snapshot.expires_at,
        language: snapshot.language,
    })
}
