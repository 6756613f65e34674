use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::error::ProbeError;

/// Status and body of a probed endpoint. Bodies that are not JSON are kept
/// as a JSON string.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ProbeResponse {
    /// Looks up a nested body field by JSON pointer, e.g. `/data/quality_grade`.
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.body.pointer(pointer)
    }
}

#[derive(Debug, Clone)]
pub struct ProbeClient {
    http: reqwest::Client,
}

impl ProbeClient {
    pub fn new() -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http })
    }

    pub async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, ProbeError> {
        tracing::debug!(url, ?timeout, "GET");
        let response = self.http.get(url).timeout(timeout).send().await?;
        Self::read(response).await
    }

    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<ProbeResponse, ProbeError> {
        tracing::debug!(url, ?timeout, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .timeout(timeout)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<ProbeResponse, ProbeError> {
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        tracing::debug!(%status, "Probe response");
        Ok(ProbeResponse { status, body })
    }
}
