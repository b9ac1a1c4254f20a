use std::sync::Arc;
use std::time::Duration;

use cached::Return;
#[allow(unused_imports)]
use cached::proc_macro::cached;
use tracing::debug;

use crate::clients::CrmClient;
use crate::error::{Error, Result};
use crate::models::CrmUser;
use crate::session::SessionManager;
use crate::utils::log_throttle::LogThrottle;

const CACHE_HIT_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Looks up CRM users by name or email fragment.
///
/// Results are cached for 30 seconds per CRM, token and term; only successful
/// lookups are cached.
pub struct UserSearch {
    crm: Arc<CrmClient>,
    session: Arc<SessionManager>,
    throttle: LogThrottle,
}

#[cfg_attr(
    not(test),
    cached(time = 30, result = true, with_cached_flag = true)
)]
async fn find_users_cached(
    crm_url: String,
    access_token: String,
    term: String,
) -> std::result::Result<Return<Vec<CrmUser>>, String> {
    debug!(
        event_name = "queries.users.find",
        event_domain = "queries",
        "searching CRM users"
    );
    CrmClient::new(&crm_url)
        .find_users(&access_token, &term)
        .await
        .map(Return::new)
        .map_err(|e| e.to_string())
}

impl UserSearch {
    pub fn new(crm: Arc<CrmClient>, session: Arc<SessionManager>) -> Self {
        Self {
            crm,
            session,
            throttle: LogThrottle::new(CACHE_HIT_LOG_WINDOW),
        }
    }

    /// An empty term matches nobody and makes no request.
    pub async fn find(&self, term: &str) -> Result<Vec<CrmUser>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let token = self
            .session
            .access_token()
            .ok_or(Error::NotReady)?;

        let users = find_users_cached(
            self.crm.base_url().to_string(),
            token,
            term.to_string(),
        )
        .await
        .map_err(Error::Decode)?;

        if users.was_cached {
            if let Some(suppressed_count) = self.throttle.should_emit("queries.users.cache.hit") {
                debug!(
                    event_name = "queries.users.cache.hit",
                    event_domain = "queries",
                    cache_ttl_seconds = 30,
                    suppressed_count,
                    "user search served from cache"
                );
            }
        }
        Ok(users.value)
    }
}
