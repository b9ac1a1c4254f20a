use serde::{Deserialize, Serialize};

use crate::utils::value::string_or_number;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CrmAccess {
    pub app: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CrmLanguage {
    pub language_code: String,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// `GET api/v1/users/me` data.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CrmUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub access: Vec<CrmAccess>,
    #[serde(default)]
    pub active_flag: bool,
    #[serde(default)]
    pub language: Option<CrmLanguage>,
}

impl CrmUser {
    /// Global admin rights gate the Document Server settings page.
    pub fn is_admin(&self) -> bool {
        self.access.iter().any(|a| a.app == "global" && a.admin)
    }
}

/// Envelope used by every CRM v1 endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CrmEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}
