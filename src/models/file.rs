use serde::{Deserialize, Serialize};

use crate::utils::value::string_or_number;

/// A file attached to a CRM deal.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct CrmFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub deal_id: String,
    pub name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub add_time: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub remote_location: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Pagination {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub next_start: Option<u32>,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub more_items_in_collection: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct AdditionalData {
    #[serde(default)]
    pub pagination: Pagination,
}

/// Raw CRM listing payload. `data` is `null` for an empty collection.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FileListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<CrmFile>>,
    #[serde(default)]
    pub additional_data: AdditionalData,
}

/// One page of files as consumed by the rest of the app.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct FilePage {
    pub response: Vec<CrmFile>,
    pub pagination: Pagination,
}

impl FilePage {
    /// The degraded result used when listing gives up.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start offset of the following page, if the collection has more items.
    pub fn next_start(&self) -> Option<u32> {
        if self.pagination.more_items_in_collection {
            Some(
                self.pagination
                    .next_start
                    .unwrap_or(self.pagination.start + self.response.len() as u32),
            )
        } else {
            None
        }
    }
}

impl From<FileListResponse> for FilePage {
    fn from(raw: FileListResponse) -> Self {
        FilePage {
            response: raw.data.unwrap_or_default(),
            pagination: raw.additional_data.pagination,
        }
    }
}

/// `POST api/v1/files` answers with the stored file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    pub data: CrmFile,
}
