//! HTTP route definitions and handlers.
//!
//! A thin local facade over the session, queries and actions: session
//! status, file classification, deal files, documents, settings, users,
//! host dialogs and the editor configuration.

mod dialog_routes;
mod editor_routes;
mod file_routes;
mod format_routes;
mod health_routes;
mod session_routes;
mod settings_routes;
mod user_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    let editor_route = state.config.editor.route.clone();
    Router::new()
        .merge(session_routes::routes())
        .merge(format_routes::routes())
        .merge(file_routes::routes())
        .merge(settings_routes::routes())
        .merge(dialog_routes::routes())
        .merge(user_routes::routes())
        .merge(editor_routes::routes(&editor_route))
        .merge(health_routes::routes())
        .with_state(state)
}
