use std::sync::Arc;

use tracing::{debug, info, warn};

use super::now_millis;
use super::storage::ExpiringStore;
use crate::clients::{CrmClient, GatewayClient};
use crate::error::Result;
use crate::models::TokenGrant;
use crate::sdk::HostSdk;

/// Cache key of the current grant.
pub const GRANT_CACHE_KEY: &str = "authorization";

/// Where fresh access tokens come from.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch(&self) -> Result<TokenGrant>;

    /// Called after a failed refresh so the next session does not reuse stale state.
    fn invalidate(&self) {}
}

/// Host SDK handshake followed by the gateway's "who am I" exchange.
///
/// Grants are cached until they enter the expiry margin, after which the next
/// fetch exchanges again. The CRM user's language is resolved with the fresh
/// token; failure to do so fails the whole fetch.
pub struct GatewayTokenSource {
    sdk: Arc<dyn HostSdk>,
    gateway: Arc<GatewayClient>,
    crm: Arc<CrmClient>,
    cache: Arc<ExpiringStore>,
    expiry_margin: i64,
}

impl GatewayTokenSource {
    pub fn new(
        sdk: Arc<dyn HostSdk>,
        gateway: Arc<GatewayClient>,
        crm: Arc<CrmClient>,
        cache: Arc<ExpiringStore>,
        expiry_margin: i64,
    ) -> Self {
        Self {
            sdk,
            gateway,
            crm,
            cache,
            expiry_margin,
        }
    }

    async fn grant(&self) -> Result<TokenGrant> {
        if let Some(grant) = self.cache.get_with_expiry::<TokenGrant>(GRANT_CACHE_KEY) {
            if grant.lifetime(now_millis()) > self.expiry_margin {
                debug!(event_name = "session.grant.cache.hit", event_domain = "session", "using cached grant");
                return Ok(grant);
            }
            debug!(
                event_name = "session.grant.cache.stale",
                event_domain = "session",
                expires_at = grant.expires_at,
                "cached grant is inside the expiry margin, exchanging again"
            );
        }
        let signed = self.sdk.signed_token().await?;
        let grant = self.gateway.me(&signed.token).await?;
        if let Err(e) = self
            .cache
            .set_with_expiry(GRANT_CACHE_KEY, &grant, grant.expires_at)
        {
            warn!("Could not cache access token: {}", e);
        }
        info!(
            event_name = "session.grant.exchanged",
            event_domain = "session",
            expires_at = grant.expires_at,
            "exchanged signed context for an access token"
        );
        Ok(grant)
    }
}

#[async_trait::async_trait]
impl TokenSource for GatewayTokenSource {
    async fn fetch(&self) -> Result<TokenGrant> {
        let mut grant = self.grant().await?;
        let me = self.crm.me(&grant.access_token).await?;
        grant.language = me.language.map(|l| l.language_code);
        Ok(grant)
    }

    fn invalidate(&self) {
        if let Err(e) = self.cache.remove(GRANT_CACHE_KEY) {
            warn!("Could not evict cached access token: {}", e);
        }
    }
}
