//! `reqwest` clients for the backend gateway and the CRM REST API.

pub mod crm;
pub mod gateway;
pub mod retry;

use std::future::Future;

use futures::future::{AbortRegistration, Abortable};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub use crm::CrmClient;
pub use gateway::GatewayClient;
pub use retry::{with_retry, RetryCondition, RetryPolicy};

/// Maps a non-success status to [`Error::Status`] carrying the response body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = check_status(response).await?.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
}

/// Runs `fut` until it completes or the registration's handle aborts it.
pub async fn abortable<T, F>(signal: Option<AbortRegistration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match signal {
        Some(registration) => Abortable::new(fut, registration)
            .await
            .unwrap_or(Err(Error::Cancelled)),
        None => fut.await,
    }
}
