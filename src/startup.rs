//! Application startup and server initialization.
//!
//! Builds the clients, the token source and the session from configuration,
//! starts the refresh loop and serves the local facade.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::actions::Actions;
use crate::clients::{CrmClient, GatewayClient};
use crate::config::ConfigV1;
use crate::queries::UserSearch;
use crate::routes;
use crate::sdk::{ConfiguredSdk, HostSdk};
use crate::session::{ExpiringStore, GatewayTokenSource, SessionManager};
use crate::state::AppState;

/// Wires every component together. The refresh loop is not started.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    let crm = Arc::new(CrmClient::new(&config.crm.base_url));
    let gateway = Arc::new(GatewayClient::new(&config.gateway.base_url));
    let sdk: Arc<dyn HostSdk> = Arc::new(ConfiguredSdk::new(&config.sdk));
    let cache = Arc::new(match &config.session.cache_path {
        Some(path) => ExpiringStore::open(path),
        None => ExpiringStore::in_memory(),
    });

    let source = Arc::new(GatewayTokenSource::new(
        sdk.clone(),
        gateway.clone(),
        crm.clone(),
        cache,
        config.session.expiry_margin(),
    ));
    let session = SessionManager::new(source, config.session.clone());

    let actions = Actions::new(
        crm.clone(),
        gateway.clone(),
        session.clone(),
        sdk,
        config.editor.clone(),
    );
    let users = Arc::new(UserSearch::new(crm.clone(), session.clone()));

    AppState {
        config,
        session,
        crm,
        gateway,
        actions,
        users,
    }
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone());
    let session = state.session.clone();
    session.start();

    info!("Starting server on {}", config.bind_address);

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    let served = axum::serve(listener, app).await;

    session.stop();
    served?;
    Ok(())
}
