//! Session/token lifecycle.
//!
//! A [`SessionManager`] owns the single [`AuthToken`] record of a running app.
//! Its refresh loop is the only writer; everything else reads snapshots or
//! subscribes to changes.

pub mod manager;
pub mod source;
pub mod storage;

use chrono::Utc;
use serde::Serialize;

use crate::models::TokenGrant;

pub use manager::{RefreshOutcome, SessionManager};
pub use source::{GatewayTokenSource, TokenSource};
pub use storage::ExpiringStore;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// How a failed session should be presented.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionFailure {
    /// The integration was rejected (HTTP 401): it has to be reinstalled.
    Unauthorized,
    /// Anything else: a reload may help.
    Generic,
}

/// The shared authentication record.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken {
    pub access_token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub error: bool,
    pub status: Option<u16>,
    pub language: Option<String>,
}

impl AuthToken {
    pub fn from_grant(grant: TokenGrant) -> Self {
        AuthToken {
            access_token: grant.access_token,
            expires_at: grant.expires_at,
            error: false,
            status: None,
            language: grant.language,
        }
    }

    pub fn failed(status: Option<u16>, expires_at: i64) -> Self {
        AuthToken {
            access_token: String::new(),
            expires_at,
            error: true,
            status,
            language: None,
        }
    }

    /// True when the loop should fetch a new grant at `now`.
    pub fn needs_refresh(&self, now: i64, margin: i64) -> bool {
        !self.error && (self.access_token.is_empty() || now >= self.expires_at.saturating_sub(margin))
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Usable token: not failed, not empty, not past expiry.
    pub fn is_ready(&self, now: i64) -> bool {
        !self.error && !self.access_token.is_empty() && !self.is_expired(now)
    }

    pub fn failure(&self) -> Option<SessionFailure> {
        match (self.error, self.status) {
            (false, _) => None,
            (true, Some(401)) => Some(SessionFailure::Unauthorized),
            (true, _) => Some(SessionFailure::Generic),
        }
    }

    /// Copy safe to hand out at `now`: an expired token is reported as empty.
    pub fn view_at(&self, now: i64) -> AuthToken {
        let mut view = self.clone();
        if view.is_expired(now) {
            view.access_token.clear();
        }
        view
    }
}
