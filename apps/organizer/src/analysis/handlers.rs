//! Axum route handlers for prompt rendering and document analysis.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::service::{analyze_document, summarize_for_embedding, AnalysisReport};
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::prompts::{
    render_analyze_file_prompt, render_embedding_summary_prompt, DocumentMetadata, MetadataFields,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeFileRequest {
    #[serde(default)]
    pub metadata: MetadataFields,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/prompts/analyze-file
///
/// Renders the analyze-file prompt exactly as given; no truncation.
pub async fn handle_render_analyze_file(
    Json(request): Json<AnalyzeFileRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let metadata = DocumentMetadata::try_from(request.metadata)?;
    let prompt = render_analyze_file_prompt(&metadata, &request.content)?;
    Ok(Json(PromptResponse { prompt }))
}

/// POST /api/v1/prompts/embedding-summary
pub async fn handle_render_embedding_summary(
    Json(request): Json<ContentRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let prompt = render_embedding_summary_prompt(&request.content)?;
    Ok(Json(PromptResponse { prompt }))
}

/// POST /api/v1/documents/analyze
///
/// Analyzes a document supplied as metadata plus extracted text.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeFileRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    let metadata = DocumentMetadata::try_from(request.metadata)?;
    let report = analyze_document(state.analyzer.as_ref(), &metadata, &request.content).await?;
    Ok(Json(report))
}

/// POST /api/v1/documents/upload
///
/// Multipart form: `file` (required) and `created_date` (optional, defaults to today).
/// Text is extracted from the file, then analyzed like `/documents/analyze`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let max_bytes = state.config.max_file_size_bytes();
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut created_date: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((name, mime, bytes.to_vec()));
            }
            Some("created_date") => {
                created_date = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (name, mime, bytes) =
        file.ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;

    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "'{name}' is {} bytes, limit is {max_bytes}",
            bytes.len()
        )));
    }

    let metadata = DocumentMetadata::new(
        name,
        mime.clone(),
        bytes.len() as u64,
        created_date.unwrap_or_else(|| chrono::Utc::now().date_naive().to_string()),
    );
    info!(name = %metadata.current_name, mime = %mime, size = metadata.size, "document uploaded");

    // pdf-extract is CPU-bound and may panic on malformed input.
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, &mime))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("text extraction task failed: {e}")))??;

    let report = analyze_document(state.analyzer.as_ref(), &metadata, &text).await?;
    Ok(Json(report))
}

/// POST /api/v1/documents/embedding-summary
pub async fn handle_embedding_summary(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    let summary = summarize_for_embedding(state.analyzer.as_ref(), &request.content).await?;
    Ok(Json(SummaryResponse { summary }))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("invalid multipart body: {}", err.body_text()))
    }
}
