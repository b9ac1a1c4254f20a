use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Document Server connection settings, managed by CRM admins.
///
/// Either all three credentials are set, or none are and the integration
/// runs in demo mode.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct DocSettings {
    #[serde(default)]
    pub doc_address: String,
    #[serde(default)]
    pub doc_secret: String,
    #[serde(default)]
    pub doc_header: String,
    #[serde(default)]
    pub demo_enabled: bool,
    /// Epoch milliseconds when demo mode was first enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_started: Option<i64>,
}

impl DocSettings {
    /// Trims every credential and checks the all-or-nothing rule.
    pub fn normalized(mut self) -> Result<Self> {
        self.doc_address = self.doc_address.trim().to_string();
        self.doc_secret = self.doc_secret.trim().to_string();
        self.doc_header = self.doc_header.trim().to_string();

        if !self.has_credentials() {
            return Ok(self);
        }
        if self.doc_address.is_empty() {
            return Err(Error::Invalid("document server address is required".into()));
        }
        if self.doc_secret.is_empty() {
            return Err(Error::Invalid("document server secret is required".into()));
        }
        if self.doc_header.is_empty() {
            return Err(Error::Invalid("document server header is required".into()));
        }
        Ok(self)
    }

    pub fn has_credentials(&self) -> bool {
        !self.doc_address.is_empty() || !self.doc_secret.is_empty() || !self.doc_header.is_empty()
    }
}
