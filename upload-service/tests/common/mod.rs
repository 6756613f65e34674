#![allow(dead_code)]

use reqwest::multipart::{Form, Part};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use upload_service::config::UploadConfig;
use upload_service::services::DiskStorage;
use upload_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub storage: Arc<DiskStorage>,
    pub client: reqwest::Client,
    // Held so the directory lives as long as the app.
    _upload_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let upload_dir = tempfile::tempdir().expect("Failed to create temp upload dir");

        let mut config = UploadConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.storage.upload_dir = upload_dir.path().display().to_string();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let storage = app.storage().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp {
            address,
            port,
            storage,
            client: reqwest::Client::new(),
            _upload_dir: upload_dir,
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.storage.base_path().to_path_buf()
    }

    /// Names of every file currently in the upload directory.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .expect("Failed to read upload dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn post_form(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn image_part(bytes: Vec<u8>, filename: &str, mime: &str) -> Part {
    Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime)
        .unwrap()
}
