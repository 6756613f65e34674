use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

pub const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub limits: UploadLimits,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory accepted files are written to and served from.
    pub upload_dir: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes. A file of exactly this size passes.
    pub max_file_size: u64,
    /// Most files a multi-file field may carry.
    pub max_files: usize,
    /// Largest non-file form value, in bytes.
    pub max_field_size: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 5 * MIB,
            max_files: 5,
            max_field_size: MIB as usize,
        }
    }
}

impl UploadLimits {
    /// Ceiling for a whole multipart body: every allowed file at full size,
    /// one extra so an oversized file still reaches the per-file check, and
    /// room for text fields.
    pub fn request_body_limit(&self) -> usize {
        let files = self.max_file_size.saturating_mul(self.max_files as u64 + 1);
        usize::try_from(files)
            .unwrap_or(usize::MAX)
            .saturating_add(self.max_field_size)
    }
}

impl UploadConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        let defaults = UploadLimits::default();

        Ok(UploadConfig {
            common: common_config,
            storage: StorageConfig {
                upload_dir: get_env("UPLOAD_DIR", Some("uploads"), is_prod)?,
            },
            limits: UploadLimits {
                max_file_size: get_env_parsed("UPLOAD_MAX_FILE_SIZE", defaults.max_file_size)?,
                max_files: get_env_parsed("UPLOAD_MAX_FILES", defaults.max_files)?,
                max_field_size: get_env_parsed("UPLOAD_MAX_FIELD_SIZE", defaults.max_field_size)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

/// Limits always have a sane default, so they are optional even in prod.
fn get_env_parsed<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value {:?}: {}", key, val, e))
        }),
        Err(_) => Ok(default),
    }
}
