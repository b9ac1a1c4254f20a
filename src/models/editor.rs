use serde::{Deserialize, Serialize};

/// What the current user may do with the opened document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub comment: bool,
    pub copy: bool,
    pub delete_comment_author_only: bool,
    pub download: bool,
    pub edit: bool,
    pub edit_comment_author_only: bool,
    pub fill_forms: bool,
    pub modify_content_control: bool,
    pub modify_filter: bool,
    pub print: bool,
    pub review: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    pub file_type: String,
    pub key: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub hide_right_menu: bool,
    pub plugins: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub user: EditorUser,
    pub callback_url: String,
    #[serde(default)]
    pub customization: Customization,
    #[serde(default)]
    pub lang: String,
}

/// `GET /api/config`: everything the embedded editor needs to boot.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigResponse {
    pub document: EditorDocument,
    pub document_type: String,
    pub editor_config: EditorSettings,
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    #[serde(rename = "server_url", default)]
    pub server_url: String,
}
