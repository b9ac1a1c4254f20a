//! Deal file endpoints: listing, upload, download, delete and document creation.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::actions::DocumentKind;
use crate::formats::{classify, extension_of, format_bytes, mime_type_of, Classification};
use crate::models::{CrmFile, Pagination};
use crate::queries::FileSearch;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers file routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals/:deal_id/files", get(list_files).post(upload_file))
        .route("/deals/:deal_id/documents", post(create_document))
        .route("/files/:id", delete(delete_file))
        .route("/files/:id/download", get(download_file))
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    start: u32,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct FileEntry {
    #[serde(flatten)]
    file: CrmFile,
    size: String,
    classification: Classification,
    editor_url: Option<String>,
}

#[derive(Serialize)]
struct FileListing {
    files: Vec<FileEntry>,
    pagination: Pagination,
    next_start: Option<u32>,
}

/// Name of the file an action refers to, for user-facing messages.
#[derive(Deserialize)]
struct FileName {
    name: Option<String>,
}

#[derive(Deserialize)]
struct UploadParams {
    filename: String,
}

#[derive(Deserialize)]
struct CreateDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    kind: DocumentKind,
}

#[derive(Serialize)]
struct CreatedDocument {
    url: String,
}

async fn list_files(
    Path(deal_id): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<AppState>,
) -> Result<Json<FileListing>, HTTPError> {
    let mut search = FileSearch::new(
        state.crm.clone(),
        state.session.clone(),
        &deal_id,
        &state.config.files,
    );
    if let Some(limit) = params.limit {
        search = search.with_limit(limit);
    }
    let page = search.fetch_page(params.start, None).await?;
    let next_start = page.next_start();

    let links = state.actions.editor_links(&page.response, &deal_id).await;
    let files = page
        .response
        .into_iter()
        .zip(links)
        .map(|(file, editor_url)| FileEntry {
            size: format_bytes(file.file_size, 2),
            classification: classify(&file.name),
            editor_url,
            file,
        })
        .collect();

    Ok(Json(FileListing {
        files,
        pagination: page.pagination,
        next_start,
    }))
}

async fn upload_file(
    Path(deal_id): Path<String>,
    Query(params): Query<UploadParams>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CrmFile>), HTTPError> {
    let stored = state
        .actions
        .upload_file(&deal_id, &params.filename, body.to_vec())
        .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn create_document(
    Path(deal_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<CreateDocument>,
) -> Result<(StatusCode, Json<CreatedDocument>), HTTPError> {
    let url = state
        .actions
        .create_document(&deal_id, &request.title, request.kind)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedDocument { url })))
}

async fn delete_file(
    Path(id): Path<String>,
    Query(params): Query<FileName>,
    State(state): State<AppState>,
) -> Result<StatusCode, HTTPError> {
    let file = file_ref(id, params.name);
    state.actions.delete_file(&file, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download_file(
    Path(id): Path<String>,
    Query(params): Query<FileName>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HTTPError> {
    let file = file_ref(id, params.name);
    let content = state.actions.download_file(&file).await?;
    let mime = mime_type_of(&extension_of(&file.name));
    Ok(([(header::CONTENT_TYPE, mime)], content))
}

fn file_ref(id: String, name: Option<String>) -> CrmFile {
    CrmFile {
        name: name.unwrap_or_else(|| id.clone()),
        id,
        ..CrmFile::default()
    }
}
