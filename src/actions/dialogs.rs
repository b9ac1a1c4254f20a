use tracing::debug;

use super::Actions;
use crate::error::{Error, Result};
use crate::sdk::Modal;

impl Actions {
    /// Opens the create-or-upload dialog over the deal panel.
    pub async fn open_creation_dialog(&self) -> Result<()> {
        debug!(event_name = "actions.dialogs.open", event_domain = "actions", "opening creation dialog");
        self.sdk.open_modal(Modal::Creation).await
    }

    /// Dismisses the creation or upload dialog.
    pub async fn close_dialog(&self) -> Result<()> {
        debug!(event_name = "actions.dialogs.close", event_domain = "actions", "closing dialog");
        self.sdk.close_modal().await
    }

    /// Asks the host to resize the surface the extension is rendered in.
    pub async fn resize_surface(&self, height: u32, width: Option<u32>) -> Result<()> {
        if height == 0 || width == Some(0) {
            return Err(Error::Invalid("surface size must not be zero".into()));
        }
        self.sdk.resize(height, width).await
    }
}
