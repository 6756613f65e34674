//! End-to-end check of the AI service's food assessment endpoint.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde_json::json;
use std::path::Path;

use crate::client::ProbeClient;
use crate::config::{ProbeConfig, ASSESS_TIMEOUT};
use crate::error::ProbeError;
use crate::report::{show, Report};

/// A 1x1 JPEG, enough for the service to exercise its pipeline.
pub const SAMPLE_JPEG_BASE64: &str = concat!(
    "/9j/4AAQSkZJRgABAQAAAQABAAD/2wBDAAYEBQYFBAYGBQYHBwYIChAKCgkJChQODwwQFxQYGBcUFhYa",
    "HSUfGhsjHBYWICwgIyYnKSopGR8tMC0oMCUoKSj/2wBDAQcHBwoIChMKChMoGhYaKCgoKCgoKCgoKCgo",
    "KCgoKCgoKCgoKCgoKCgoKCgoKCgoKCgoKCgoKCgoKCgoKCgoKCj/wAARCAABAAEDASIAAhEBAxEB/8QA",
    "FQABAQAAAAAAAAAAAAAAAAAAAAv/xAAUEAEAAAAAAAAAAAAAAAAAAAAA/8QAFQEBAQAAAAAAAAAAAAAA",
    "AAAAAAX/xAAUEQEAAAAAAAAAAAAAAAAAAAAA/9oADAMBAAIRAxEAPwCdABmX/9k=",
);

const AI_START_HINT: &str = "python backend/services/foodCV.py";

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Builds the `data:` URL sent as `image`: the configured file when set,
/// otherwise the built-in sample.
pub async fn image_payload(config: &ProbeConfig) -> Result<String, ProbeError> {
    match &config.assess_image_path {
        Some(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|source| ProbeError::Image {
                path: path.clone(),
                source,
            })?;
            Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes)))
        }
        None => Ok(format!("data:image/jpeg;base64,{}", SAMPLE_JPEG_BASE64)),
    }
}

/// Posts one image for assessment and prints the grade and freshness score.
/// Returns whether the service answered 200.
pub async fn run_assessment(
    client: &ProbeClient,
    config: &ProbeConfig,
    report: &mut Report,
) -> bool {
    report.line("🧪 Testing AI Food Assessment...");
    report.blank();

    let image = match image_payload(config).await {
        Ok(image) => image,
        Err(e) => {
            report.line(format!("❌ Test failed: {}", e));
            return false;
        }
    };

    report.line(format!("Sending request to {}...", config.ai_assess_url()));
    let result = client
        .post_json(&config.ai_assess_url(), &json!({ "image": image }), ASSESS_TIMEOUT)
        .await;

    let ok = match result {
        Ok(response) if response.status == StatusCode::OK => {
            report.line("✅ AI service test successful!");
            report.line(format!(
                "   Quality Grade: {}",
                show(response.field("/data/quality_grade"))
            ));
            report.line(format!(
                "   Freshness: {}%",
                show(response.field("/data/freshness_score"))
            ));
            true
        }
        Ok(response) => {
            report.line(format!(
                "❌ AI service returned error: {}",
                response.status.as_u16()
            ));
            report.line(format!("   Response: {}", response.body));
            false
        }
        Err(e) if e.is_connect() => {
            report.line(format!(
                "❌ AI service is not running. Start it with: {}",
                AI_START_HINT
            ));
            false
        }
        Err(e) => {
            report.line(format!("❌ Test failed: {}", e));
            false
        }
    };

    report.blank();
    if ok {
        report.line("🎉 AI assessment is working!");
    } else {
        report.line("⚠️  AI assessment needs attention.");
    }
    ok
}
