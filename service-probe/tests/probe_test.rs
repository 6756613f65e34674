use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use service_probe::{
    assess::run_assessment,
    probe_health,
    suite::{run_quick_check, run_service_suite},
    Health, HealthReport, ProbeClient, ProbeConfig, ProbeError, Report,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// An address with nothing listening on it.
async fn closed_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn client() -> ProbeClient {
    ProbeClient::new().expect("Failed to build client")
}

async fn health_at(url: String) -> HealthReport {
    probe_health(&client(), "Backend", &url, Duration::from_secs(5)).await
}

#[tokio::test]
async fn plain_text_200_is_healthy() {
    let base = serve(Router::new().route("/health", get(|| async { "OK" }))).await;

    let report = health_at(format!("{}/health", base)).await;

    assert!(report.is_healthy());
    assert_eq!(report.body, Some(Value::String("OK".into())));
}

#[tokio::test]
async fn non_200_success_codes_are_unhealthy() {
    let base = serve(
        Router::new()
            .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/broken",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"status": "ok"})),
                    )
                }),
            ),
    )
    .await;

    for (path, code) in [("/empty", 204), ("/broken", 500)] {
        let report = health_at(format!("{}{}", base, path)).await;
        match report.health {
            Health::Unhealthy(status) => assert_eq!(status.as_u16(), code),
            other => panic!("expected unhealthy, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let base = closed_address().await;

    let report = health_at(format!("{}/api/health", base)).await;

    assert!(!report.is_healthy());
    assert!(report.is_refused());
}

#[tokio::test]
async fn slow_service_times_out() {
    let base = serve(Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "late"
        }),
    ))
    .await;

    let result = client()
        .get(&format!("{}/health", base), Duration::from_millis(100))
        .await;

    assert!(matches!(result, Err(ProbeError::Timeout)));
}

#[tokio::test]
async fn quick_check_hints_at_starting_missing_ai_service() {
    let backend = serve(Router::new().route(
        "/api/health",
        get(|| async { Json(json!({"success": true})) }),
    ))
    .await;
    let config = ProbeConfig::new(backend, closed_address().await);
    let mut report = Report::silent();

    let summary = run_quick_check(&client(), &config, &mut report).await;

    assert!(summary.backend);
    assert!(!summary.ai_service);
    assert!(report.contains("✅ Backend is healthy"));
    assert!(report.contains("💡 Start AI service with: npm run start-cv"));
    assert!(report.contains("Start AI: npm run start-cv"));
    assert!(!report.contains("Start backend"));
}

#[tokio::test]
async fn quick_check_prints_ai_service_name() {
    let ai = serve(Router::new().route(
        "/health",
        get(|| async { Json(json!({"service": "FoodCV"})) }),
    ))
    .await;
    let config = ProbeConfig::new(closed_address().await, ai);
    let mut report = Report::silent();

    let summary = run_quick_check(&client(), &config, &mut report).await;

    assert!(!summary.backend);
    assert!(summary.ai_service);
    assert!(report.contains("   Service: FoodCV"));
    assert!(report.contains("Start backend: npm run server"));
}

fn backend_stub(ai_status: StatusCode) -> Router {
    Router::new()
        .route(
            "/api/health",
            get(|| async { Json(json!({"success": true, "message": "FoodShare API is running"})) }),
        )
        .route(
            "/api/food/ai-status",
            get(move || async move {
                (
                    ai_status,
                    Json(json!({"success": true, "aiService": {"status": "connected"}})),
                )
            }),
        )
}

fn ai_stub(ensemble_ready: bool, predictions: Arc<AtomicUsize>) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async {
                Json(json!({"service": "FoodCV", "version": "2.0", "models_loaded": 3}))
            }),
        )
        .route(
            "/models/status",
            get(move || async move {
                Json(json!({
                    "models": {"freshness": {"status": "ready"}, "grader": {"status": "loading"}},
                    "summary": {
                        "total_models": 2,
                        "ready_models": 1,
                        "ensemble_ready": ensemble_ready,
                        "food_categories_count": 12
                    }
                }))
            }),
        )
        .route(
            "/test-prediction",
            post(move || {
                let predictions = predictions.clone();
                async move {
                    predictions.fetch_add(1, Ordering::SeqCst);
                    Json(json!({
                        "success": true,
                        "test_result": {"data": {"quality_grade": "Good", "confidence": 88}}
                    }))
                }
            }),
        )
}

#[tokio::test]
async fn full_suite_passes_against_healthy_services() {
    let predictions = counter();
    let config = ProbeConfig::new(
        serve(backend_stub(StatusCode::OK)).await,
        serve(ai_stub(true, predictions.clone())).await,
    );
    let mut report = Report::silent();

    let results = run_service_suite(&client(), &config, &mut report).await;

    assert!(results.all_passed());
    assert_eq!(predictions.load(Ordering::SeqCst), 1);
    assert!(report.contains("5/5 tests passed"));
    assert!(report.contains("✅ Backend is healthy: FoodShare API is running"));
    assert!(report.contains("   Models loaded: 3"));
    assert!(report.contains("   ❌ grader: loading"));
    assert!(report.contains("   Quality grade: Good"));
    assert!(report.contains("   AI Service status: connected"));
}

#[tokio::test]
async fn prediction_is_skipped_when_ensemble_not_ready() {
    let predictions = counter();
    let config = ProbeConfig::new(
        serve(backend_stub(StatusCode::OK)).await,
        serve(ai_stub(false, predictions.clone())).await,
    );
    let mut report = Report::silent();

    let results = run_service_suite(&client(), &config, &mut report).await;

    assert!(results.ai_service);
    assert!(!results.ai_models);
    assert!(!results.ai_prediction);
    assert_eq!(predictions.load(Ordering::SeqCst), 0);
    assert!(report.contains("3/5 tests passed"));
}

#[tokio::test]
async fn ai_checks_are_skipped_when_ai_service_is_down() {
    let models_hits = counter();
    let hits = models_hits.clone();
    let ai = serve(
        Router::new()
            .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/models/status",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({}))
                    }
                }),
            ),
    )
    .await;
    let config = ProbeConfig::new(closed_address().await, ai);
    let mut report = Report::silent();

    let results = run_service_suite(&client(), &config, &mut report).await;

    assert_eq!(results.passed(), 0);
    assert_eq!(models_hits.load(Ordering::SeqCst), 0);
    assert!(report.contains("0/5 tests passed"));
    assert!(report.contains("⚠️  Some services need attention."));
}

#[tokio::test]
async fn unauthorized_integration_counts_as_passed() {
    let config = ProbeConfig::new(
        serve(backend_stub(StatusCode::UNAUTHORIZED)).await,
        closed_address().await,
    );
    let mut report = Report::silent();

    let results = run_service_suite(&client(), &config, &mut report).await;

    assert!(results.backend);
    assert!(results.integration);
    assert!(report.contains("Integration test skipped (auth required)"));
    assert!(report.contains("2/5 tests passed"));
}

#[tokio::test]
async fn assessment_prints_grade_and_freshness() {
    let ai = serve(Router::new().route(
        "/assess-food",
        post(|Json(body): Json<Value>| async move {
            let image = body["image"].as_str().unwrap_or_default();
            if !image.starts_with("data:image/jpeg;base64,") {
                return (StatusCode::BAD_REQUEST, Json(json!({"success": false})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {"quality_grade": "Excellent", "freshness_score": 92}
                })),
            )
        }),
    ))
    .await;
    let config = ProbeConfig::new(closed_address().await, ai);
    let mut report = Report::silent();

    assert!(run_assessment(&client(), &config, &mut report).await);
    assert!(report.contains("   Quality Grade: Excellent"));
    assert!(report.contains("   Freshness: 92%"));
}

#[tokio::test]
async fn assessment_tolerates_unexpected_shape() {
    let ai = serve(Router::new().route(
        "/assess-food",
        post(|| async { Json(json!({"success": true})) }),
    ))
    .await;
    let config = ProbeConfig::new(closed_address().await, ai);
    let mut report = Report::silent();

    assert!(run_assessment(&client(), &config, &mut report).await);
    assert!(report.contains("   Quality Grade: n/a"));
}

#[tokio::test]
async fn assessment_reports_missing_service() {
    let config = ProbeConfig::new(closed_address().await, closed_address().await);
    let mut report = Report::silent();

    assert!(!run_assessment(&client(), &config, &mut report).await);
    assert!(report.contains("AI service is not running"));
}
