use serde::{Deserialize, Serialize};

/// Response of the gateway's `GET /api/me`: an application access token for the CRM.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
    #[serde(default, deserialize_with = "crate::utils::value::string_or_number")]
    pub id: String,
    pub access_token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
    /// Resolved from the CRM after the exchange, never part of the gateway payload.
    #[serde(skip)]
    pub language: Option<String>,
}

impl TokenGrant {
    /// Milliseconds left before expiry, relative to `now`.
    pub fn lifetime(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

/// The signed context token issued by the host CRM's extension runtime.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
}
