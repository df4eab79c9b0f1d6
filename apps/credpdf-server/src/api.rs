//! API handlers for the credential PDF server

use axum::{
    extract::Multipart,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use credpdf_core::{get_page_count, load_rows, pipeline, CredentialRow, PersonalizeRequest};
use serde::Serialize;
use tracing::info;

use crate::error::ServerError;
use crate::form::UploadForm;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "credpdf-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub count: usize,
    pub rows: Vec<CredentialRow>,
    /// Page count of the template, when one was uploaded alongside the CSV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Handler: POST /api/preview
///
/// Parses the CSV the way generation would. An uploaded template is only
/// parsed for its page count.
pub async fn handle_preview(multipart: Multipart) -> Result<Json<PreviewResponse>, ServerError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let csv = form
        .credentials
        .as_deref()
        .ok_or(ServerError::MissingUpload("credential CSV"))?;

    let rows = load_rows(csv, form.flag("keep_credentials"))?;
    let page_count = form.template.as_deref().map(get_page_count).transpose()?;
    info!(
        "Preview: {} row(s) loaded, template pages: {:?}",
        rows.len(),
        page_count
    );

    Ok(Json(PreviewResponse {
        success: true,
        count: rows.len(),
        rows,
        page_count,
    }))
}

#[derive(Serialize)]
pub struct EmptyResultResponse {
    pub success: bool,
    pub warning: &'static str,
}

/// Handler: POST /api/generate
pub async fn handle_generate(multipart: Multipart) -> Result<Response, ServerError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let settings = form.settings()?;
    let template = form
        .template
        .ok_or(ServerError::MissingUpload("template PDF"))?;
    let csv = form
        .credentials
        .ok_or(ServerError::MissingUpload("credential CSV"))?;

    info!(
        "Generate request: template={} bytes, csv={} bytes, page_index={}",
        template.len(),
        csv.len(),
        settings.page_index
    );

    // PDF work is CPU-bound; keep it off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        pipeline::run(&PersonalizeRequest {
            csv: &csv,
            template: &template,
            settings,
        })
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Generation task failed: {}", e)))??;

    let Some(artifact) = outcome.artifact else {
        return Ok(Json(EmptyResultResponse {
            success: true,
            warning: "No PDF was generated",
        })
        .into_response());
    };

    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&artifact.file_name),
            ),
        ],
        artifact.data,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback name and the exact name
/// percent-encoded in `filename*`.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
