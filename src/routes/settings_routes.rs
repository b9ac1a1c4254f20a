//! Document Server settings endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use crate::models::DocSettings;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).post(save_settings))
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<DocSettings>, HTTPError> {
    match state.actions.load_settings().await? {
        Some(settings) => Ok(Json(settings)),
        None => Err(HTTPError::new(
            StatusCode::FORBIDDEN,
            "Settings are available to administrators only",
        )),
    }
}

async fn save_settings(
    State(state): State<AppState>,
    Json(settings): Json<DocSettings>,
) -> Result<Json<DocSettings>, HTTPError> {
    let saved = state.actions.save_settings(settings).await?;
    Ok(Json(saved))
}
