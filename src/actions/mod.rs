//! User actions: file operations, document creation and settings.
//!
//! Every action reports its outcome to the user through the host's snackbar;
//! the returned `Result` is for the caller.

pub mod creation;
pub mod dialogs;
pub mod files;
pub mod settings;

use std::sync::Arc;

use crate::clients::{CrmClient, GatewayClient};
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::formats::FormatTable;
use crate::sdk::HostSdk;
use crate::session::SessionManager;

pub use creation::DocumentKind;

/// Collaborators shared by all actions.
#[derive(Clone)]
pub struct Actions {
    crm: Arc<CrmClient>,
    gateway: Arc<GatewayClient>,
    session: Arc<SessionManager>,
    sdk: Arc<dyn HostSdk>,
    table: &'static FormatTable,
    editor: EditorConfig,
}

impl Actions {
    pub fn new(
        crm: Arc<CrmClient>,
        gateway: Arc<GatewayClient>,
        session: Arc<SessionManager>,
        sdk: Arc<dyn HostSdk>,
        editor: EditorConfig,
    ) -> Self {
        Self {
            crm,
            gateway,
            session,
            sdk,
            table: FormatTable::builtin(),
            editor,
        }
    }

    fn access_token(&self) -> Result<String> {
        self.session
            .access_token()
            .ok_or(Error::NotReady)
    }
}
