use std::time::Duration;

use futures::future::AbortRegistration;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::retry::{with_retry, RetryPolicy};
use super::{abortable, check_status, decode_json};
use crate::error::{Error, Result};
use crate::models::{CrmEnvelope, CrmFile, CrmUser, FileListResponse, FilePage, UploadResponse};

pub const DELETE_TIMEOUT: Duration = Duration::from_millis(4_500);
pub const USER_LOOKUP_TIMEOUT: Duration = Duration::from_millis(4_000);

/// Listing parameters for a deal's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub start: u32,
    pub limit: u32,
    pub sort: String,
}

impl Default for FileQuery {
    fn default() -> Self {
        Self {
            start: 0,
            limit: 50,
            sort: "add_time ASC".to_string(),
        }
    }
}

/// Client for the company's CRM REST API (v1), authenticated with the
/// bearer access token held by the session.
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl CrmClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One listing attempt; retries belong to the caller.
    pub async fn list_deal_files(
        &self,
        access_token: &str,
        deal_id: &str,
        query: &FileQuery,
    ) -> Result<FilePage> {
        let url = self.endpoint(&format!("deals/{}/files", deal_id));
        debug!(deal_id, start = query.start, limit = query.limit, "listing deal files");
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("start", query.start.to_string()),
                ("limit", query.limit.to_string()),
                ("sort", query.sort.clone()),
            ])
            .send()
            .await?;
        decode_json::<FileListResponse>(response)
            .await
            .map(FilePage::from)
    }

    /// Single attempt, bounded by [`DELETE_TIMEOUT`].
    pub async fn delete_file(
        &self,
        access_token: &str,
        file_id: &str,
        signal: Option<AbortRegistration>,
    ) -> Result<bool> {
        let url = self.endpoint(&format!("files/{}", file_id));
        let policy = RetryPolicy::single_attempt(DELETE_TIMEOUT);
        let delete = with_retry(
            &policy,
            "crm.files.delete",
            || async {
                let response = self
                    .http
                    .delete(&url)
                    .bearer_auth(access_token)
                    .send()
                    .await?;
                let response = check_status(response).await?;
                Ok(response.status() == reqwest::StatusCode::OK)
            },
        );
        abortable(signal, delete).await
    }

    /// Multipart upload of a new file attached to `deal_id`.
    pub async fn upload_file(
        &self,
        access_token: &str,
        deal_id: &str,
        filename: &str,
        mime: &str,
        content: Vec<u8>,
    ) -> Result<CrmFile> {
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| Error::Invalid(format!("mime type '{}': {}", mime, e)))?;
        let form = Form::new()
            .part("file", part)
            .text("deal_id", deal_id.to_string());

        let response = self
            .http
            .post(self.endpoint("files"))
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;
        decode_json::<UploadResponse>(response)
            .await
            .map(|uploaded| uploaded.data)
    }

    /// Raw file content through the CRM download proxy.
    pub async fn download_file(&self, access_token: &str, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.endpoint(&format!("files/{}/download", file_id)))
            .bearer_auth(access_token)
            .send()
            .await?;
        let bytes = check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// `GET api/v1/users/me`.
    pub async fn me(&self, access_token: &str) -> Result<CrmUser> {
        let response = self
            .http
            .get(self.endpoint("users/me"))
            .bearer_auth(access_token)
            .timeout(USER_LOOKUP_TIMEOUT)
            .send()
            .await?;
        decode_json::<CrmEnvelope<CrmUser>>(response)
            .await
            .map(|envelope| envelope.data)
    }

    /// `GET api/v1/users/find?term=`. A search without hits returns an empty list.
    pub async fn find_users(&self, access_token: &str, term: &str) -> Result<Vec<CrmUser>> {
        let response = self
            .http
            .get(self.endpoint("users/find"))
            .bearer_auth(access_token)
            .query(&[("term", term)])
            .timeout(USER_LOOKUP_TIMEOUT)
            .send()
            .await?;
        decode_json::<CrmEnvelope<Option<Vec<CrmUser>>>>(response)
            .await
            .map(|envelope| envelope.data.unwrap_or_default())
    }
}
