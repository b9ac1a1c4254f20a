use futures::future::AbortRegistration;
use tracing::debug;

use super::retry::{with_retry, RetryPolicy};
use super::{abortable, check_status, decode_json};
use crate::editor::EditorOpenRequest;
use crate::error::Result;
use crate::models::{DocSettings, EditorConfigResponse, TokenGrant};

/// Header carrying the host-issued signed context token.
pub const APP_CONTEXT_HEADER: &str = "X-Pipedrive-App-Context";

/// Client for the backend gateway. Every call is authenticated with the
/// signed context token rather than the CRM access token.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/me`: exchanges the signed context for a CRM access token.
    pub async fn me(&self, signed_token: &str) -> Result<TokenGrant> {
        let url = self.endpoint("/api/me");
        with_retry(&RetryPolicy::gateway(), "gateway.me", || async {
            debug!("Requesting access token from {}", url);
            let response = self
                .http
                .get(&url)
                .header(APP_CONTEXT_HEADER, signed_token)
                .send()
                .await?;
            decode_json::<TokenGrant>(response).await
        })
        .await
    }

    /// `GET /api/config`: the embedded editor configuration for one file version.
    pub async fn editor_config(
        &self,
        request: &EditorOpenRequest,
        dark: bool,
        signal: Option<AbortRegistration>,
    ) -> Result<EditorConfigResponse> {
        let url = self.endpoint("/api/config");
        let dark = dark.to_string();
        let policy = RetryPolicy::gateway();
        let fetch = with_retry(&policy, "gateway.config", || async {
            let response = self
                .http
                .get(&url)
                .header(APP_CONTEXT_HEADER, &request.token)
                .query(&[
                    ("id", request.id.as_str()),
                    ("name", request.name.as_str()),
                    ("key", request.key.as_str()),
                    ("deal_id", request.deal_id.as_str()),
                    ("dark", dark.as_str()),
                ])
                .send()
                .await?;
            decode_json::<EditorConfigResponse>(response).await
        });
        abortable(signal, fetch).await
    }

    /// `GET /api/settings` (admins only).
    pub async fn settings(&self, signed_token: &str) -> Result<DocSettings> {
        let url = self.endpoint("/api/settings");
        with_retry(&RetryPolicy::gateway(), "gateway.settings.get", || async {
            let response = self
                .http
                .get(&url)
                .header(APP_CONTEXT_HEADER, signed_token)
                .send()
                .await?;
            decode_json::<DocSettings>(response).await
        })
        .await
    }

    /// `POST /api/settings`, retried only when rate limited.
    pub async fn save_settings(&self, signed_token: &str, settings: &DocSettings) -> Result<()> {
        let url = self.endpoint("/api/settings");
        with_retry(&RetryPolicy::settings_save(), "gateway.settings.post", || async {
            let response = self
                .http
                .post(&url)
                .header(APP_CONTEXT_HEADER, signed_token)
                .json(settings)
                .send()
                .await?;
            check_status(response).await.map(|_| ())
        })
        .await
    }
}
