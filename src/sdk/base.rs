use crate::error::Result;
use crate::models::SignedToken;

/// Modal windows the extension can ask the host to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// Create or upload a document for the current deal.
    Creation,
}

impl Modal {
    pub fn action_id(&self) -> &'static str {
        match self {
            Modal::Creation => "onlyoffice-create",
        }
    }
}

/// The host CRM's extension runtime.
///
/// Only these commands are consumed; everything else the runtime offers is
/// out of reach of the core.
#[async_trait::async_trait]
pub trait HostSdk: Send + Sync {
    /// Short-lived signed context token identifying the company and user.
    async fn signed_token(&self) -> Result<SignedToken>;
    async fn show_snackbar(&self, message: &str) -> Result<()>;
    async fn resize(&self, height: u32, width: Option<u32>) -> Result<()>;
    async fn open_modal(&self, modal: Modal) -> Result<()>;
    async fn close_modal(&self) -> Result<()>;
}

/// Shows a snackbar without letting a broken host fail the calling action.
pub async fn notify(sdk: &dyn HostSdk, message: &str) {
    if let Err(e) = sdk.show_snackbar(message).await {
        tracing::warn!(
            event_name = "sdk.snackbar.failed",
            event_domain = "sdk",
            "could not show notification: {}",
            e
        );
    }
}
