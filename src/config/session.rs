use std::path::PathBuf;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Timing of the token refresh loop.
///
/// The refresh interval and the safety margin before expiry are plain
/// configuration: the loop refreshes once the current time is within
/// `expiry_margin_ms` of the token's `expires_at`.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_expiry_margin_ms")]
    pub expiry_margin_ms: u64,
    /// Delay before the first tick. Zero refreshes immediately on start.
    #[serde(default)]
    pub initial_delay_ms: u64,
    /// Where fetched grants are cached between runs. In-memory when unset.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_refresh_interval_ms() -> u64 {
    1_000
}

fn default_expiry_margin_ms() -> u64 {
    19_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            expiry_margin_ms: default_expiry_margin_ms(),
            initial_delay_ms: 0,
            cache_path: None,
        }
    }
}

impl SessionConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Margin in milliseconds, as compared against epoch-millis timestamps.
    pub fn expiry_margin(&self) -> i64 {
        i64::try_from(self.expiry_margin_ms).unwrap_or(i64::MAX)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval_ms == 0 {
            return Err("session.refresh_interval_ms must be greater than zero".into());
        }
        if self.expiry_margin_ms == 0 {
            return Err("session.expiry_margin_ms must be greater than zero".into());
        }
        Ok(())
    }
}
