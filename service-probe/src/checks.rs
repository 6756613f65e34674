use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use crate::client::{ProbeClient, ProbeResponse};
use crate::error::ProbeError;
use crate::report::Report;

/// A service is healthy only when it answers exactly 200; the body is not
/// inspected.
pub fn classify(status: StatusCode) -> bool {
    status == StatusCode::OK
}

#[derive(Debug)]
pub enum Health {
    Healthy,
    Unhealthy(StatusCode),
    Unreachable(ProbeError),
}

#[derive(Debug)]
pub struct HealthReport {
    pub service: String,
    pub health: Health,
    /// Response body, when the service answered at all.
    pub body: Option<Value>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.health, Health::Healthy)
    }

    /// True when the failure was a refused connection, i.e. the service is
    /// not started.
    pub fn is_refused(&self) -> bool {
        matches!(&self.health, Health::Unreachable(e) if e.is_connect())
    }

    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.pointer(pointer))
    }

    /// One status line in the `✅ Backend is healthy` style.
    pub fn describe(&self, report: &mut Report) {
        match &self.health {
            Health::Healthy => report.line(format!("✅ {} is healthy", self.service)),
            Health::Unhealthy(status) => report.line(format!(
                "❌ {} returned status: {}",
                self.service,
                status.as_u16()
            )),
            Health::Unreachable(e) => {
                report.line(format!("❌ {} not responding: {}", self.service, e))
            }
        }
    }
}

pub async fn probe_health(
    client: &ProbeClient,
    service: &str,
    url: &str,
    timeout: Duration,
) -> HealthReport {
    let (health, body) = match client.get(url, timeout).await {
        Ok(ProbeResponse { status, body }) if classify(status) => (Health::Healthy, Some(body)),
        Ok(ProbeResponse { status, body }) => (Health::Unhealthy(status), Some(body)),
        Err(e) => (Health::Unreachable(e), None),
    };

    tracing::debug!(service, url, healthy = matches!(health, Health::Healthy), "Health probe");

    HealthReport {
        service: service.to_string(),
        health,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_is_healthy() {
        assert!(classify(StatusCode::OK));
        assert!(!classify(StatusCode::NO_CONTENT));
        assert!(!classify(StatusCode::MOVED_PERMANENTLY));
        assert!(!classify(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn describe_reports_status_code() {
        let report_for = |health| HealthReport {
            service: "Backend".into(),
            health,
            body: None,
        };
        let mut report = Report::silent();

        report_for(Health::Healthy).describe(&mut report);
        report_for(Health::Unhealthy(StatusCode::INTERNAL_SERVER_ERROR)).describe(&mut report);
        report_for(Health::Unreachable(ProbeError::Timeout)).describe(&mut report);

        assert_eq!(
            report.lines(),
            [
                "✅ Backend is healthy",
                "❌ Backend returned status: 500",
                "❌ Backend not responding: Request timeout",
            ]
        );
    }
}
