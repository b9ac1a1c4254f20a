//! CRM user lookup.

use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use serde::Deserialize;

use crate::models::CrmUser;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers user routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(find_users))
}

#[derive(Deserialize)]
struct UserQuery {
    #[serde(default)]
    term: String,
}

async fn find_users(
    Query(query): Query<UserQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CrmUser>>, HTTPError> {
    let users = state.users.find(&query.term).await?;
    Ok(Json(users))
}
