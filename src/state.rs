//! Shared application state.
//!
//! Everything a handler needs: configuration, the session and the clients
//! built on top of it.

use std::sync::Arc;

use crate::actions::Actions;
use crate::clients::{CrmClient, GatewayClient};
use crate::config::ConfigV1;
use crate::queries::UserSearch;
use crate::session::SessionManager;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Owner of the CRM access token.
    pub session: Arc<SessionManager>,
    pub crm: Arc<CrmClient>,
    pub gateway: Arc<GatewayClient>,
    pub actions: Actions,
    pub users: Arc<UserSearch>,
}
