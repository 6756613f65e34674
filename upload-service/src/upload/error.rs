use axum::extract::multipart::MultipartError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::{AppError, ErrorResponse};
use thiserror::Error;

use crate::services::metrics;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Images only! (jpeg, jpg, png, gif, webp)")]
    InvalidFileType,

    #[error("File exceeds {limit} bytes")]
    FileTooLarge { limit: u64 },

    /// A file arrived under the wrong field name, or past the field's count.
    #[error("Unexpected file in field {field} (at most {max_count})")]
    UnexpectedFile { field: String, max_count: usize },

    #[error("Field value too long: {field}")]
    FieldTooLarge { field: String },

    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl UploadError {
    /// Error code for failures raised by the multipart layer itself; `None`
    /// for everything else (file-type rejections, I/O, handler errors).
    pub fn code(&self) -> Option<&'static str> {
        match self {
            UploadError::FileTooLarge { .. } => Some("LIMIT_FILE_SIZE"),
            UploadError::UnexpectedFile { .. } => Some("LIMIT_UNEXPECTED_FILE"),
            UploadError::FieldTooLarge { .. } => Some("LIMIT_FIELD_VALUE"),
            UploadError::Multipart(_) => Some("MALFORMED_MULTIPART"),
            UploadError::InvalidFileType | UploadError::App(_) => None,
        }
    }
}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::App(AppError::from(err))
    }
}

/// A 400 answer produced for a recognized multipart failure.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRejection {
    pub message: String,
}

impl UploadRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for UploadRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// Client-facing text for `LIMIT_FILE_SIZE`.
pub const FILE_TOO_LARGE_MESSAGE: &str = "File size cannot exceed 5MB";
/// Client-facing text for `LIMIT_UNEXPECTED_FILE`, in every upload mode.
pub const TOO_MANY_FILES_MESSAGE: &str = "Maximum 5 images allowed";
pub const FIELD_TOO_LARGE_MESSAGE: &str = "Field value too long";

/// Maps recognized multipart failures to fixed client messages. Anything
/// that did not come from the multipart layer is handed back untouched for
/// the generic error handler.
pub fn translate_upload_error(err: UploadError) -> Result<UploadRejection, AppError> {
    match err {
        UploadError::FileTooLarge { .. } => Ok(UploadRejection::new(FILE_TOO_LARGE_MESSAGE)),
        UploadError::UnexpectedFile { .. } => Ok(UploadRejection::new(TOO_MANY_FILES_MESSAGE)),
        UploadError::FieldTooLarge { .. } => Ok(UploadRejection::new(FIELD_TOO_LARGE_MESSAGE)),
        UploadError::Multipart(_) => Ok(UploadRejection::new(err.to_string())),
        UploadError::InvalidFileType => Err(AppError::BadRequest(anyhow::anyhow!(
            UploadError::InvalidFileType.to_string()
        ))),
        UploadError::App(app) => Err(app),
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let code = self.code().unwrap_or("UPLOAD_REJECTED");
        tracing::warn!(code, error = %self, "Upload rejected");
        metrics::record_upload_rejected(code);

        match translate_upload_error(self) {
            Ok(rejection) => rejection.into_response(),
            Err(app) => app.into_response(),
        }
    }
}
