use service_probe::{suite::run_service_suite, ProbeClient, ProbeConfig, Report};

#[tokio::main]
async fn main() {
    service_probe::init_tracing();

    let config = ProbeConfig::from_env();
    tracing::info!(
        backend = %config.backend_url,
        ai_service = %config.ai_service_url,
        "Running service checks"
    );

    let client = match ProbeClient::new() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            return;
        }
    };

    let mut report = Report::stdout();
    run_service_suite(&client, &config, &mut report).await;
}
