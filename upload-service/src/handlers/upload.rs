use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use service_core::error::AppError;
use std::collections::HashMap;

use crate::services::storage::is_plain_filename;
use crate::startup::AppState;
use crate::upload::{StoredFile, UploadError};

/// Public URL of a stored file, as served by the static `/uploads` route.
fn public_url(file: &StoredFile) -> String {
    format!("/uploads/{}", file.filename)
}

#[derive(Debug, Serialize)]
pub struct StoredFileResponse {
    #[serde(flatten)]
    pub file: StoredFile,
    pub url: String,
}

impl From<StoredFile> for StoredFileResponse {
    fn from(file: StoredFile) -> Self {
        let url = public_url(&file);
        Self { file, url }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub message: String,
    pub data: StoredFileResponse,
}

#[derive(Debug, Serialize)]
pub struct UploadImagesResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<StoredFileResponse>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
}

fn no_file() -> AppError {
    AppError::BadRequest(anyhow::anyhow!("Please upload an image"))
}

/// A body that is not multipart carries no image.
fn require_multipart(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, AppError> {
    multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Upload request is not multipart");
        no_file()
    })
}

/// Single image under the `image` field.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, UploadError> {
    let multipart = require_multipart(multipart)?;
    let upload = state.gate.single("image", multipart).await?;
    let file = upload.files.into_iter().next().ok_or_else(no_file)?;

    Ok((
        StatusCode::CREATED,
        Json(UploadImageResponse {
            success: true,
            message: "Image uploaded successfully".to_string(),
            data: file.into(),
        }),
    ))
}

/// Up to `max_files` images under the `images` field.
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, UploadError> {
    let multipart = require_multipart(multipart)?;
    let max_files = state.gate.limits().max_files;
    let upload = state.gate.array("images", max_files, multipart).await?;

    if upload.files.is_empty() {
        return Err(no_file().into());
    }

    Ok((
        StatusCode::CREATED,
        Json(UploadImagesResponse {
            success: true,
            count: upload.files.len(),
            data: upload.files.into_iter().map(Into::into).collect(),
            fields: upload.fields,
        }),
    ))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !is_plain_filename(&filename) {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Please provide a valid image filename"
        )));
    }

    if !state.storage.remove(&filename).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Image not found")));
    }

    tracing::info!(filename = %filename, "Image deleted");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Image deleted successfully"
    })))
}
