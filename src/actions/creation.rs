use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Actions;
use crate::editor::{build_upload_filename, EditorOpenRequest, MAX_TITLE_CHARS};
use crate::error::{Error, Result};
use crate::sdk::notify;

/// Title used when the user leaves it blank.
pub const DEFAULT_TITLE: &str = "New Document";

/// Blank document types offered by the creation dialog.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Docx,
    Xlsx,
    Pptx,
}

impl DocumentKind {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Xlsx => "xlsx",
            DocumentKind::Pptx => "pptx",
        }
    }
}

/// Checks a document title. Blank titles fall back to [`DEFAULT_TITLE`].
pub fn validate_title(title: &str) -> Result<&str> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(DEFAULT_TITLE);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::Invalid(format!(
            "title is longer than {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(title)
}

impl Actions {
    /// Uploads an empty document of `kind` to `deal_id` and returns the
    /// editor link for it.
    ///
    /// An over-long title is rejected before anything is sent.
    pub async fn create_document(&self, deal_id: &str, title: &str, kind: DocumentKind) -> Result<String> {
        let title = validate_title(title)?;
        let result = self.upload_blank(deal_id, title, kind).await;
        if let Err(e) = &result {
            warn!(
                event_name = "actions.creation.failed",
                event_domain = "actions",
                deal_id,
                kind = kind.extension(),
                "could not create document: {}",
                e
            );
            notify(self.sdk.as_ref(), "Could not create a new file").await;
        }
        result
    }

    async fn upload_blank(&self, deal_id: &str, title: &str, kind: DocumentKind) -> Result<String> {
        let signed = self.sdk.signed_token().await?;
        let token = self.access_token()?;
        let filename = build_upload_filename(title, kind.extension());
        let mime = self.table.mime_type_of(kind.extension());

        let stored = self
            .crm
            .upload_file(&token, deal_id, &filename, &mime, Vec::new())
            .await?;
        info!(
            event_name = "actions.creation.created",
            event_domain = "actions",
            file_id = stored.id.as_str(),
            deal_id = stored.deal_id.as_str(),
            "blank document created"
        );

        EditorOpenRequest::for_file(&signed.token, &stored, &stored.deal_id)
            .to_url(&self.editor.route, self.editor.link_format)
    }
}
