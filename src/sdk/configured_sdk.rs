use std::sync::Mutex;

use tracing::info;

use super::base::{HostSdk, Modal};
use crate::config::SdkConfig;
use crate::error::{Error, Result};
use crate::models::SignedToken;

/// Host stand-in driven by configuration.
///
/// Hands out the configured signed token and records every UI command so
/// callers (and tests) can inspect what the host was asked to do.
#[derive(Debug, Default)]
pub struct ConfiguredSdk {
    signed_token: String,
    notifications: Mutex<Vec<String>>,
    modal: Mutex<Option<Modal>>,
    size: Mutex<Option<(u32, Option<u32>)>>,
}

impl ConfiguredSdk {
    pub fn new(config: &SdkConfig) -> Self {
        Self::with_token(&config.signed_token)
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            signed_token: token.to_string(),
            ..Self::default()
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn open_modal_state(&self) -> Option<Modal> {
        self.modal.lock().ok().and_then(|m| *m)
    }

    pub fn size(&self) -> Option<(u32, Option<u32>)> {
        self.size.lock().ok().and_then(|s| *s)
    }
}

#[async_trait::async_trait]
impl HostSdk for ConfiguredSdk {
    async fn signed_token(&self) -> Result<SignedToken> {
        if self.signed_token.is_empty() {
            return Err(Error::Sdk("no signed token configured".into()));
        }
        Ok(SignedToken {
            token: self.signed_token.clone(),
        })
    }

    async fn show_snackbar(&self, message: &str) -> Result<()> {
        info!(event_name = "sdk.snackbar", event_domain = "sdk", "{}", message);
        self.notifications
            .lock()
            .map_err(|_| Error::Sdk("notification log poisoned".into()))?
            .push(message.to_string());
        Ok(())
    }

    async fn resize(&self, height: u32, width: Option<u32>) -> Result<()> {
        *self
            .size
            .lock()
            .map_err(|_| Error::Sdk("size state poisoned".into()))? = Some((height, width));
        Ok(())
    }

    async fn open_modal(&self, modal: Modal) -> Result<()> {
        info!(
            event_name = "sdk.modal.open",
            event_domain = "sdk",
            action_id = modal.action_id(),
            "opening modal"
        );
        *self
            .modal
            .lock()
            .map_err(|_| Error::Sdk("modal state poisoned".into()))? = Some(modal);
        Ok(())
    }

    async fn close_modal(&self) -> Result<()> {
        *self
            .modal
            .lock()
            .map_err(|_| Error::Sdk("modal state poisoned".into()))? = None;
        Ok(())
    }
}
