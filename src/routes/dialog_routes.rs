//! Host dialog and surface commands.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    routing::{delete, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers dialog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dialogs/creation", post(open_creation))
        .route("/dialogs", delete(close_dialog))
        .route("/surface/size", put(resize_surface))
}

#[derive(Deserialize)]
struct SurfaceSize {
    height: u32,
    width: Option<u32>,
}

async fn open_creation(State(state): State<AppState>) -> Result<StatusCode, HTTPError> {
    state.actions.open_creation_dialog().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn close_dialog(State(state): State<AppState>) -> Result<StatusCode, HTTPError> {
    state.actions.close_dialog().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn resize_surface(
    State(state): State<AppState>,
    Json(size): Json<SurfaceSize>,
) -> Result<StatusCode, HTTPError> {
    state.actions.resize_surface(size.height, size.width).await?;
    Ok(StatusCode::NO_CONTENT)
}
