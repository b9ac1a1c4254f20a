use tracing::{info, warn};

use super::Actions;
use crate::error::Result;
use crate::models::DocSettings;
use crate::sdk::notify;

impl Actions {
    /// Current Document Server settings, or `None` when the user is not a
    /// global admin.
    pub async fn load_settings(&self) -> Result<Option<DocSettings>> {
        let token = self.access_token()?;
        let me = self.crm.me(&token).await?;
        if !me.is_admin() {
            return Ok(None);
        }
        let signed = self.sdk.signed_token().await?;
        self.gateway.settings(&signed.token).await.map(Some)
    }

    /// Validates and stores `settings`, returning what was sent.
    ///
    /// The address gets a trailing `/`. Invalid input is rejected before
    /// anything is sent and without a notification.
    pub async fn save_settings(&self, settings: DocSettings) -> Result<DocSettings> {
        let mut settings = settings.normalized()?;
        if settings.has_credentials() && !settings.doc_address.ends_with('/') {
            settings.doc_address.push('/');
        }

        let result = match self.sdk.signed_token().await {
            Ok(signed) => self.gateway.save_settings(&signed.token, &settings).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                info!(
                    event_name = "actions.settings.saved",
                    event_domain = "actions",
                    demo_enabled = settings.demo_enabled,
                    "document server settings saved"
                );
                notify(self.sdk.as_ref(), "ONLYOFFICE settings have been saved").await;
                Ok(settings)
            }
            Err(e) => {
                warn!(
                    event_name = "actions.settings.save_failed",
                    event_domain = "actions",
                    "could not save settings: {}",
                    e
                );
                notify(self.sdk.as_ref(), "Could not save ONLYOFFICE settings").await;
                Err(e)
            }
        }
    }
}
