use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;

use axum::extract::multipart::{Field, Multipart};
use serde::Serialize;
use service_core::error::AppError;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::error::UploadError;
use super::filter::check_file_type;
use super::naming::unique_filename;
use crate::config::UploadLimits;
use crate::services::{metrics, DiskStorage};

/// Attempts at finding a free name before giving up.
const NAME_ATTEMPTS: usize = 3;

/// Descriptor of a file the gate accepted and wrote to disk.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub field_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub destination: String,
    pub filename: String,
    pub path: String,
    pub size: u64,
}

/// Everything the gate pulled out of one multipart request.
#[derive(Debug, Default)]
pub struct Upload {
    pub files: Vec<StoredFile>,
    /// Plain (non-file) form fields.
    pub fields: HashMap<String, String>,
}

#[derive(Clone)]
pub struct UploadGate {
    storage: Arc<DiskStorage>,
    limits: UploadLimits,
}

impl UploadGate {
    pub fn new(storage: Arc<DiskStorage>, limits: UploadLimits) -> Self {
        Self { storage, limits }
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// At most one file, under `field`.
    pub async fn single(&self, field: &str, multipart: Multipart) -> Result<Upload, UploadError> {
        self.accept(field, 1, multipart).await
    }

    /// Up to `max_count` files, all under `field`.
    pub async fn array(
        &self,
        field: &str,
        max_count: usize,
        multipart: Multipart,
    ) -> Result<Upload, UploadError> {
        self.accept(field, max_count, multipart).await
    }

    async fn accept(
        &self,
        field: &str,
        max_count: usize,
        mut multipart: Multipart,
    ) -> Result<Upload, UploadError> {
        let mut upload = Upload::default();

        if let Err(e) = self.drain(field, max_count, &mut multipart, &mut upload).await {
            // All or nothing: drop whatever this request already stored.
            for file in &upload.files {
                if let Err(remove_err) = self.storage.remove(&file.filename).await {
                    tracing::error!(
                        filename = %file.filename,
                        error = %remove_err,
                        "Failed to clean up rejected upload"
                    );
                }
            }
            return Err(e);
        }

        for file in &upload.files {
            metrics::record_upload_accepted(file.size);
            tracing::info!(
                filename = %file.filename,
                original_name = %file.original_name,
                size = file.size,
                "File stored"
            );
        }

        Ok(upload)
    }

    async fn drain(
        &self,
        field: &str,
        max_count: usize,
        multipart: &mut Multipart,
        upload: &mut Upload,
    ) -> Result<(), UploadError> {
        while let Some(mut part) = multipart.next_field().await? {
            let name = part.name().unwrap_or_default().to_string();

            let Some(original_name) = part.file_name().map(str::to_string) else {
                let value = self.read_text(&name, &mut part).await?;
                upload.fields.insert(name, value);
                continue;
            };

            if name != field || upload.files.len() >= max_count {
                return Err(UploadError::UnexpectedFile {
                    field: name,
                    max_count,
                });
            }

            let mime_type = part
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            check_file_type(&original_name, &mime_type)?;

            let stored = self
                .store(&name, original_name, mime_type, &mut part)
                .await?;
            upload.files.push(stored);
        }

        Ok(())
    }

    async fn read_text(&self, name: &str, part: &mut Field<'_>) -> Result<String, UploadError> {
        let mut value = Vec::new();
        while let Some(chunk) = part.chunk().await? {
            if value.len() + chunk.len() > self.limits.max_field_size {
                return Err(UploadError::FieldTooLarge {
                    field: name.to_string(),
                });
            }
            value.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&value).into_owned())
    }

    async fn store(
        &self,
        field_name: &str,
        original_name: String,
        mime_type: String,
        part: &mut Field<'_>,
    ) -> Result<StoredFile, UploadError> {
        let (filename, mut file) = self.create_unique(field_name, &original_name).await?;

        let size = match self.write_limited(&mut file, part).await {
            Ok(size) => size,
            Err(e) => {
                drop(file);
                if let Err(remove_err) = self.storage.remove(&filename).await {
                    tracing::error!(
                        filename = %filename,
                        error = %remove_err,
                        "Failed to remove partial upload"
                    );
                }
                return Err(e);
            }
        };

        Ok(StoredFile {
            field_name: field_name.to_string(),
            original_name,
            mime_type,
            destination: self.storage.base_path().display().to_string(),
            path: self.storage.path_for(&filename).display().to_string(),
            filename,
            size,
        })
    }

    async fn create_unique(
        &self,
        field_name: &str,
        original_name: &str,
    ) -> Result<(String, File), UploadError> {
        for _ in 0..NAME_ATTEMPTS {
            let filename = unique_filename(field_name, original_name);
            match self.storage.create(&filename).await {
                Ok(file) => return Ok((filename, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(filename = %filename, "Upload name collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::InternalError(anyhow::anyhow!(
            "Could not allocate a unique upload filename"
        ))
        .into())
    }

    /// Streams the part to `file`, stopping as soon as the size ceiling is
    /// crossed so an oversized body is never fully read.
    async fn write_limited(
        &self,
        file: &mut File,
        part: &mut Field<'_>,
    ) -> Result<u64, UploadError> {
        let limit = self.limits.max_file_size;
        let mut size: u64 = 0;

        while let Some(chunk) = part.chunk().await? {
            size += chunk.len() as u64;
            if size > limit {
                return Err(UploadError::FileTooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(size)
    }
}
