use futures::future::AbortRegistration;
use tracing::{info, warn};

use crate::clients::GatewayClient;
use crate::editor::{EditorEvent, EditorOpenRequest, EditorPhase};
use crate::error::Result;
use crate::models::EditorConfigResponse;

/// State of one editor window: the open request, its configuration once
/// fetched, and where the window is in its lifecycle.
#[derive(Debug, Clone)]
pub struct EditorWindow {
    pub request: EditorOpenRequest,
    pub phase: EditorPhase,
    pub config: Option<EditorConfigResponse>,
}

impl EditorWindow {
    pub fn new(request: EditorOpenRequest) -> Self {
        Self {
            request,
            phase: EditorPhase::Loading,
            config: None,
        }
    }

    /// Fetches the configuration from the gateway and moves out of `Loading`
    /// on failure. A cancelled fetch is reported like any other failure.
    pub async fn load(
        &mut self,
        gateway: &GatewayClient,
        dark: bool,
        signal: Option<AbortRegistration>,
    ) -> Result<&EditorConfigResponse> {
        let result = gateway.editor_config(&self.request, dark, signal).await;
        self.phase = self.phase.on_config(&result);
        match result {
            Ok(config) => {
                info!(
                    event_name = "editor.config.loaded",
                    event_domain = "editor",
                    file_id = self.request.id.as_str(),
                    document_type = config.document_type.as_str(),
                    "editor configuration ready"
                );
                Ok(self.config.insert(config))
            }
            Err(e) => {
                warn!(
                    event_name = "editor.config.failed",
                    event_domain = "editor",
                    file_id = self.request.id.as_str(),
                    "could not build editor configuration: {}",
                    e
                );
                Err(e)
            }
        }
    }

    /// Feeds an event raised by the embedded editor.
    pub fn handle(&mut self, event: EditorEvent) -> EditorPhase {
        self.phase = self.phase.apply(event);
        self.phase
    }
}
