use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_AI_SERVICE_URL: &str = "http://localhost:5001";

/// Timeout for plain health probes.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const AI_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const MODELS_STATUS_TIMEOUT: Duration = Duration::from_secs(15);
pub const PREDICTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const INTEGRATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const ASSESS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub backend_url: String,
    pub ai_service_url: String,
    /// Image sent by `assess-check`; the built-in sample when unset.
    pub assess_image_path: Option<PathBuf>,
}

impl ProbeConfig {
    pub fn new(backend_url: impl Into<String>, ai_service_url: impl Into<String>) -> Self {
        Self {
            backend_url: trim_base(backend_url.into()),
            ai_service_url: trim_base(ai_service_url.into()),
            assess_image_path: None,
        }
    }

    /// Load endpoints from environment variables or use defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string()),
            std::env::var("AI_SERVICE_URL").unwrap_or_else(|_| DEFAULT_AI_SERVICE_URL.to_string()),
        );
        config.assess_image_path = std::env::var_os("ASSESS_IMAGE_PATH").map(PathBuf::from);
        config
    }

    pub fn backend_health_url(&self) -> String {
        format!("{}/api/health", self.backend_url)
    }

    pub fn backend_ai_status_url(&self) -> String {
        format!("{}/api/food/ai-status", self.backend_url)
    }

    pub fn ai_health_url(&self) -> String {
        format!("{}/health", self.ai_service_url)
    }

    pub fn ai_models_status_url(&self) -> String {
        format!("{}/models/status", self.ai_service_url)
    }

    pub fn ai_test_prediction_url(&self) -> String {
        format!("{}/test-prediction", self.ai_service_url)
    }

    pub fn ai_assess_url(&self) -> String {
        format!("{}/assess-food", self.ai_service_url)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
