use service_probe::{assess::run_assessment, ProbeClient, ProbeConfig, Report};

#[tokio::main]
async fn main() {
    service_probe::init_tracing();

    let config = ProbeConfig::from_env();
    let client = match ProbeClient::new() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            return;
        }
    };

    let mut report = Report::stdout();
    run_assessment(&client, &config, &mut report).await;
}
