use std::collections::HashMap;

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::link::{build_editor_key, display_name};
use crate::error::{Error, Result};
use crate::models::CrmFile;

/// How editor-open requests are carried in the editor route's query string.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// `?token=..&id=..&deal_id=..&name=..&key=..`
    Legacy,
    /// `?data=<percent-encoded JSON>`
    #[default]
    Data,
}

/// Parameters handed to a new editor window.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct EditorOpenRequest {
    /// Signed context token from the host SDK, forwarded to the gateway.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub deal_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
}

impl EditorOpenRequest {
    /// Request for an existing CRM file; the key tracks the file's update time.
    pub fn for_file(token: &str, file: &CrmFile, deal_id: &str) -> Self {
        EditorOpenRequest {
            token: token.to_string(),
            id: file.id.clone(),
            deal_id: deal_id.to_string(),
            name: display_name(&file.name),
            key: build_editor_key(&file.id, &file.update_time),
        }
    }

    /// Builds the link to the editor route.
    pub fn to_url(&self, route: &str, format: LinkFormat) -> Result<String> {
        let query = match format {
            LinkFormat::Legacy => [
                ("token", &self.token),
                ("deal_id", &self.deal_id),
                ("id", &self.id),
                ("name", &self.name),
                ("key", &self.key),
            ]
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&"),
            LinkFormat::Data => {
                let blob = serde_json::to_string(self)
                    .map_err(|e| Error::Invalid(format!("editor request: {}", e)))?;
                format!("data={}", urlencoding::encode(&blob))
            }
        };
        Ok(format!("{}?{}", route, query))
    }

    /// Reads either query form. Missing fields get the editor page defaults.
    pub fn from_params(params: &HashMap<String, String>, default_deal_id: &str) -> Result<Self> {
        let mut request = match params.get("data") {
            Some(blob) => serde_json::from_str::<EditorOpenRequest>(blob)
                .map_err(|e| Error::Invalid(format!("malformed editor data: {}", e)))?,
            None => {
                let field = |k: &str| params.get(k).cloned().unwrap_or_default();
                EditorOpenRequest {
                    token: field("token"),
                    id: field("id"),
                    deal_id: field("deal_id"),
                    name: field("name"),
                    key: field("key"),
                }
            }
        };

        if request.name.is_empty() {
            request.name = "new.docx".to_string();
        }
        if request.deal_id.is_empty() {
            request.deal_id = default_deal_id.to_string();
        }
        if request.key.is_empty() {
            request.key = Utc::now().format("%H:%M:%S%.3f").to_string();
        }
        if request.token.is_empty() {
            return Err(Error::Invalid("editor request carries no token".into()));
        }
        Ok(request)
    }

    pub fn from_query(query: &str, default_deal_id: &str) -> Result<Self> {
        Self::from_params(&parse_query(query), default_deal_id)
    }
}

/// Decodes `a=b&c=d` pairs. Later duplicates overwrite earlier ones.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let query = query.split_once('?').map_or(query, |(_, q)| q);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
