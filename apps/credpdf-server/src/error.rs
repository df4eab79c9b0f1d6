//! Error types for the credential PDF server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use credpdf_core::CredPdfError;
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Missing upload: {0}")]
    MissingUpload(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("{message}")]
    Unprocessable { code: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::MissingUpload(what) => (
                StatusCode::BAD_REQUEST,
                "MISSING_UPLOAD",
                format!("Upload the {} before generating", what),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            ServerError::Unprocessable { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, *code, message.clone())
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    msg.clone(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CredPdfError> for ServerError {
    fn from(err: CredPdfError) -> Self {
        if !err.is_input_error() {
            return ServerError::Internal(err.to_string());
        }
        let code = match &err {
            CredPdfError::Schema { .. } => "CSV_SCHEMA",
            CredPdfError::Validation { .. } => "CSV_VALIDATION",
            CredPdfError::EmptyInput => "CSV_EMPTY",
            CredPdfError::Csv(_) => "CSV_INVALID",
            CredPdfError::PageIndex { .. } => "PAGE_INDEX",
            CredPdfError::PatternNotFound | CredPdfError::PatternAmbiguous(_) => {
                "PATTERN_MISMATCH"
            }
            CredPdfError::ContentMissing => "CONTENT_MISSING",
            CredPdfError::Encoding { .. } => "ENCODING",
            CredPdfError::InvalidOptions(_) => "INVALID_OPTIONS",
            CredPdfError::DuplicateEntry(_) => "DUPLICATE_OUTPUT",
            CredPdfError::ParseError(_) => "PDF_PARSE",
            _ => "INVALID_INPUT",
        };
        ServerError::Unprocessable {
            code,
            message: err.to_string(),
        }
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(err.body_text())
        } else {
            ServerError::InvalidRequest(format!("Malformed upload: {}", err.body_text()))
        }
    }
}
