//! Editor page endpoint: turns an editor link into the editor configuration.

use axum::extract::{RawQuery, State};
use axum::{routing::get, Json, Router};

use crate::editor::{parse_query, EditorOpenRequest};
use crate::models::EditorConfigResponse;
use crate::queries::EditorWindow;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers the editor route at the configured path.
pub fn routes(path: &str) -> Router<AppState> {
    Router::new().route(path, get(open_editor))
}

/// Accepts both link forms. `dark=true` asks for the dark editor theme.
async fn open_editor(
    RawQuery(query): RawQuery,
    State(state): State<AppState>,
) -> Result<Json<EditorConfigResponse>, HTTPError> {
    let params = parse_query(query.as_deref().unwrap_or_default());
    let request = EditorOpenRequest::from_params(&params, &state.config.editor.default_deal_id)?;
    let dark = params.get("dark").is_some_and(|v| v == "true");

    let mut window = EditorWindow::new(request);
    let config = window.load(&state.gateway, dark, None).await?;
    Ok(Json(config.clone()))
}
