use futures::future::AbortRegistration;
use tracing::{info, warn};

use super::Actions;
use crate::editor::EditorOpenRequest;
use crate::error::{Error, Result};
use crate::formats::extension_of;
use crate::models::CrmFile;
use crate::sdk::notify;

impl Actions {
    /// Editor links for a page of files, `None` where the format cannot be viewed.
    ///
    /// The signed token is requested once per page. If the host cannot
    /// provide one the files are still listed, without links.
    pub async fn editor_links(&self, files: &[CrmFile], deal_id: &str) -> Vec<Option<String>> {
        let viewable: Vec<bool> = files
            .iter()
            .map(|file| self.table.is_viewable(&extension_of(&file.name)))
            .collect();
        if !viewable.contains(&true) {
            return vec![None; files.len()];
        }
        let signed = match self.sdk.signed_token().await {
            Ok(signed) => signed,
            Err(e) => {
                warn!(
                    event_name = "actions.files.links_unavailable",
                    event_domain = "actions",
                    deal_id,
                    "listing files without editor links: {}",
                    e
                );
                return vec![None; files.len()];
            }
        };

        files
            .iter()
            .zip(viewable)
            .map(|(file, viewable)| {
                if !viewable {
                    return None;
                }
                EditorOpenRequest::for_file(&signed.token, file, deal_id)
                    .to_url(&self.editor.route, self.editor.link_format)
                    .map_err(|e| {
                        warn!(
                            event_name = "actions.files.link_failed",
                            event_domain = "actions",
                            file_id = file.id.as_str(),
                            "could not build editor link: {}",
                            e
                        )
                    })
                    .ok()
            })
            .collect()
    }

    /// Removes `file` from the CRM. A cancelled delete shows nothing.
    pub async fn delete_file(&self, file: &CrmFile, signal: Option<AbortRegistration>) -> Result<()> {
        let result = match self.access_token() {
            Ok(token) => self.crm.delete_file(&token, &file.id, signal).await,
            Err(e) => Err(e),
        };
        let outcome = match result {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Decode("delete was not acknowledged".into())),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                info!(
                    event_name = "actions.files.deleted",
                    event_domain = "actions",
                    file_id = file.id.as_str(),
                    "file removed"
                );
                notify(self.sdk.as_ref(), &format!("File {} has been removed", file.name)).await;
                Ok(())
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(err) => {
                warn!(
                    event_name = "actions.files.delete_failed",
                    event_domain = "actions",
                    file_id = file.id.as_str(),
                    "could not remove file: {}",
                    err
                );
                notify(self.sdk.as_ref(), &format!("Could not remove file {}", file.name)).await;
                Err(err)
            }
        }
    }

    pub async fn download_file(&self, file: &CrmFile) -> Result<Vec<u8>> {
        let result = match self.access_token() {
            Ok(token) => self.crm.download_file(&token, &file.id).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!(
                event_name = "actions.files.download_failed",
                event_domain = "actions",
                file_id = file.id.as_str(),
                "could not download file: {}",
                e
            );
            notify(self.sdk.as_ref(), &format!("Could not download file {}", file.name)).await;
        }
        result
    }

    /// Attaches a local file to `deal_id`, typed by its extension.
    pub async fn upload_file(&self, deal_id: &str, filename: &str, content: Vec<u8>) -> Result<CrmFile> {
        let mime = self.table.mime_type_of(&extension_of(filename));
        let result = match self.access_token() {
            Ok(token) => {
                self.crm
                    .upload_file(&token, deal_id, filename, &mime, content)
                    .await
            }
            Err(e) => Err(e),
        };
        let message = match &result {
            Ok(_) => format!("File {} has been uploaded", filename),
            Err(e) => {
                warn!(
                    event_name = "actions.files.upload_failed",
                    event_domain = "actions",
                    deal_id,
                    "could not upload file: {}",
                    e
                );
                format!("Could not upload file {}", filename)
            }
        };
        notify(self.sdk.as_ref(), &message).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::{actions_for, ready_actions};
    use crate::editor::{build_editor_key, parse_query};
    use crate::sdk::ConfiguredSdk;
    use mockito::{Matcher, Server};
    use std::sync::Arc;

    fn file(name: &str) -> CrmFile {
        CrmFile {
            id: "5".into(),
            name: name.into(),
            update_time: "2024-01-01 10:00:00".into(),
            ..CrmFile::default()
        }
    }

    #[tokio::test]
    async fn viewable_files_get_an_editor_link() {
        let (actions, _) = actions_for("http://127.0.0.1:9");
        let links = actions
            .editor_links(&[file("report.docx"), file("archive.zip")], "12")
            .await;

        let url = links[0].as_deref().unwrap();
        assert!(url.starts_with("/editor?data="));
        let request = EditorOpenRequest::from_query(url, "1").unwrap();
        assert_eq!(request.token, "signed");
        assert_eq!(request.deal_id, "12");
        assert_eq!(request.key, build_editor_key("5", "2024-01-01 10:00:00"));

        assert_eq!(links[1], None);
    }

    #[tokio::test]
    async fn legacy_links_carry_five_parameters() {
        let (mut actions, _) = actions_for("http://127.0.0.1:9");
        actions.editor.link_format = crate::editor::LinkFormat::Legacy;
        let links = actions.editor_links(&[file("sheet.xlsx")], "3").await;
        let params = parse_query(links[0].as_deref().unwrap());
        assert_eq!(params.len(), 5);
        assert_eq!(params["name"], "sheet.xlsx");
    }

    #[tokio::test]
    async fn files_are_listed_without_links_when_the_host_has_no_token() {
        let (mut actions, _) = actions_for("http://127.0.0.1:9");
        actions.sdk = Arc::new(ConfiguredSdk::with_token(""));
        let links = actions
            .editor_links(&[file("report.docx"), file("archive.zip")], "12")
            .await;
        assert_eq!(links, vec![None, None]);
    }

    #[tokio::test]
    async fn delete_reports_success_and_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("DELETE", "/api/v1/files/5")
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;
        server
            .mock("DELETE", "/api/v1/files/6")
            .with_status(404)
            .create_async()
            .await;

        let (actions, sdk) = ready_actions(&server.url()).await;
        actions.delete_file(&file("a.docx"), None).await.unwrap();

        let mut missing = file("b.docx");
        missing.id = "6".into();
        assert!(actions.delete_file(&missing, None).await.is_err());

        assert_eq!(
            sdk.notifications(),
            vec!["File a.docx has been removed", "Could not remove file b.docx"]
        );
    }

    #[tokio::test]
    async fn failed_download_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/files/5/download")
            .with_status(500)
            .create_async()
            .await;

        let (actions, sdk) = ready_actions(&server.url()).await;
        assert!(actions.download_file(&file("a.docx")).await.is_err());
        assert_eq!(sdk.notifications(), vec!["Could not download file a.docx"]);
    }

    #[tokio::test]
    async fn upload_uses_the_format_mime_type() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/v1/files")
            .match_body(Matcher::Regex("application/pdf".into()))
            .with_status(201)
            .with_body(r#"{"success": true, "data": {"id": 8, "deal_id": 3, "name": "scan.pdf"}}"#)
            .create_async()
            .await;

        let (actions, sdk) = ready_actions(&server.url()).await;
        let stored = actions
            .upload_file("3", "scan.pdf", b"%PDF-1.7".to_vec())
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(stored.id, "8");
        assert_eq!(sdk.notifications(), vec!["File scan.pdf has been uploaded"]);
    }
}
