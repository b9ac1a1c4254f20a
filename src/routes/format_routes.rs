//! File classification endpoint.

use axum::extract::Path;
use axum::{routing::get, Json, Router};

use crate::formats::{classify, Classification};
use crate::state::AppState;

/// Registers format routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/formats/:filename", get(classify_file))
}

async fn classify_file(Path(filename): Path<String>) -> Json<Classification> {
    Json(classify(&filename))
}
