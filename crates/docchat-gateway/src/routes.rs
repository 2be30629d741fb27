//! API route handlers for the gateway.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::server::AppState;
use docchat_core::error::DocChatError;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn bad_request(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": msg})))
}

fn server_error(err: DocChatError) -> (StatusCode, Json<Value>) {
    tracing::error!("Request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": format!("Server error: {err}")})),
    )
}

/// Document id for an upload: original filename stem + upload timestamp +
/// extension, so re-uploads of the same file stay distinguishable.
fn document_id_for(filename: &str) -> String {
    let (stem, ext) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    };
    format!("{}_{}{}", stem, chrono::Utc::now().timestamp(), ext)
}

/// Upload a document: multipart field `pdf`, extract text, chunk, embed,
/// and replace whatever was loaded before.
pub async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResult {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("pdf") {
            let filename = field.file_name().unwrap_or("").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(&format!("Failed to read upload: {e}")))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(bad_request("No file part in the request"));
    };
    if filename.is_empty() {
        return Err(bad_request("No selected file"));
    }

    // pdftotext runs as a subprocess; keep it off the async workers.
    let extractor = state.extractor.clone();
    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extractor.text_of(&name, &bytes))
        .await
        .map_err(|e| server_error(DocChatError::Extraction(e.to_string())))?
        .map_err(server_error)?;

    let document_id = document_id_for(&filename);
    let chunks = state
        .service
        .ingest(&text, &document_id)
        .await
        .map_err(server_error)?;

    tracing::info!(%document_id, chunks, "Document uploaded");
    Ok(Json(json!({
        "status": "success",
        "message": format!("Uploaded and processed '{filename}' ({chunks} chunks)"),
        "filename": document_id,
    })))
}

/// Answer a question against the loaded document.
pub async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResult {
    let question = body["question"].as_str().unwrap_or("").trim();
    if question.is_empty() {
        return Err(bad_request("No question provided"));
    }

    let answer = state
        .service
        .answer(question, None)
        .await
        .map_err(server_error)?;
    Ok(Json(json!({"answer": answer})))
}

/// Report whether a document is loaded and which one.
pub async fn pdf_status(State(state): State<Arc<AppState>>) -> ApiResult {
    match state.service.status().map_err(server_error)? {
        Some(document_id) => Ok(Json(json!({"status": "uploaded", "filename": document_id}))),
        None => Ok(Json(json!({"status": "none"}))),
    }
}

/// Delete the loaded document. Safe to call when nothing is loaded.
pub async fn delete_pdf(State(state): State<Arc<AppState>>) -> ApiResult {
    state.service.delete().map_err(server_error)?;
    Ok(Json(json!({"status": "success", "message": "PDF deleted"})))
}

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "docchat-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
