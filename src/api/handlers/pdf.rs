//! PDF upload and question answering over uploaded documents.

use crate::{
    types::{AppError, AskResponse, QueryRequest, Result, UploadResponse},
    AppState,
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";

/// Status reported for a successful upload.
pub const UPLOAD_STATUS: &str = "Successfully Uploaded";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(e.body_text())
    }
}

/// Upload a PDF, then chunk, embed and index it.
#[utoipa::path(
    post,
    path = "/pdf",
    request_body(content_type = "multipart/form-data", description = "PDF in the `file` field"),
    responses(
        (status = 200, description = "Document indexed", body = UploadResponse),
        (status = 400, description = "Missing, empty or unreadable file"),
        (status = 413, description = "File exceeds the upload limit"),
        (status = 415, description = "File is not a PDF")
    ),
    tag = "pdf"
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let report = state.rag.ingest_pdf(&file_name, bytes.to_vec()).await?;

        return Ok(Json(UploadResponse {
            status: UPLOAD_STATUS.to_string(),
            filename: report.filename,
            doc_len: report.doc_len,
            chunks: report.chunks,
        }));
    }

    Err(AppError::InvalidInput(format!(
        "Multipart body has no '{}' field",
        FILE_FIELD
    )))
}

/// Answer a question from the uploaded documents, citing the chunks used.
#[utoipa::path(
    post,
    path = "/ask_pdf",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Answer with sources", body = AskResponse),
        (status = 400, description = "Empty or malformed query"),
        (status = 502, description = "Language model unavailable")
    ),
    tag = "pdf"
)]
pub async fn ask(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AskResponse>> {
    let Json(payload) = payload?;
    tracing::debug!(query = %payload.query, "Question over documents");

    let response = state.rag.ask(&payload.query).await?;

    Ok(Json(response))
}
