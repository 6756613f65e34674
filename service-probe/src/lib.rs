//! Developer health checks for the FoodShare services.
//!
//! Each binary probes locally running services in sequence, with a timeout
//! per call, and prints a human-readable pass/fail report. Failures are
//! reported, never fatal.
//!
//! ```bash
//! cargo run -p service-probe --bin quick-check
//! BACKEND_URL=http://localhost:8080 cargo run -p service-probe --bin service-check
//! ```

pub mod assess;
pub mod checks;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod suite;

pub use checks::{classify, probe_health, Health, HealthReport};
pub use client::{ProbeClient, ProbeResponse};
pub use config::ProbeConfig;
pub use error::ProbeError;
pub use report::Report;

use std::sync::Once;

static INIT: Once = Once::new();

/// Diagnostics go to stderr so stdout stays the report.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    });
}
