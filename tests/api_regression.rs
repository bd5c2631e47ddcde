//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! every /api endpoint using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use social_pulse::api::{create_app, DashboardState};
use social_pulse::config::PulseConfig;
use social_pulse::pipeline::{CycleController, PipelineCoordinator};
use social_pulse::{BusinessCategory, Platform, Post, PostSource, SourceError};

struct ThirtyPosts;

#[async_trait]
impl PostSource for ThirtyPosts {
    async fn collect(&self) -> Result<Vec<Post>, SourceError> {
        Ok((0..30)
            .map(|i| {
                Post::new(format!("t-{i}"), Platform::Twitter, BusinessCategory::Gaming, "great stream tonight")
                    .with_author("caster", 5_000)
                    .with_metric("likes", 40)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "thirty"
    }

    fn platform(&self) -> Platform {
        Platform::Twitter
    }
}

/// App over a coordinator that has already run `cycles` cycles.
async fn create_test_app(cycles: usize) -> (Router, Arc<CycleController>) {
    let config = PulseConfig::default();
    let source: Arc<dyn PostSource> = Arc::new(ThirtyPosts);
    let mut coordinator = PipelineCoordinator::new(&config, vec![source]).unwrap();
    for _ in 0..cycles {
        coordinator.run_cycle().await.unwrap();
    }

    let controller = Arc::new(CycleController::new(coordinator, CancellationToken::new()));
    let (events, _) = broadcast::channel(16);
    let state = DashboardState::new(Arc::clone(&controller), events, config.server.clone());
    (create_app(state), controller)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

async fn post_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
}

// ============================================================================
// Read endpoints
// ============================================================================

#[tokio::test]
async fn health_reports_idle_loop() {
    let (app, _) = create_test_app(0).await;
    let (status, body) = get_json(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["running"], false);
    assert_eq!(body["phase"], "idle");
}

#[tokio::test]
async fn stats_before_first_cycle_are_zero() {
    let (app, _) = create_test_app(0).await;
    let (status, body) = get_json(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iteration"], 0);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["trends_count"], 0);
    assert_eq!(body["sentiment"]["total_posts"], 0);
}

#[tokio::test]
async fn stats_reflect_completed_cycle() {
    let (app, _) = create_test_app(1).await;
    let (status, body) = get_json(app, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["iteration"], 1);
    assert_eq!(body["counters"]["posts_in_history"], 30);
    assert_eq!(body["sentiment"]["total_posts"], 30);
}

#[tokio::test]
async fn trends_is_a_json_array() {
    let (app, _) = create_test_app(1).await;
    let (status, body) = get_json(app, "/api/trends").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());
}

#[tokio::test]
async fn recent_posts_default_and_clamped_limits() {
    let (app, _) = create_test_app(5).await;

    let (status, body) = get_json(app.clone(), "/api/posts/recent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 20);

    let (_, body) = get_json(app.clone(), "/api/posts/recent?limit=5").await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    // 150 posts in the window, snapshot keeps 100, hard cap 100
    let (_, body) = get_json(app, "/api/posts/recent?limit=1000").await;
    assert_eq!(body.as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn recent_posts_carry_enrichment() {
    let (app, _) = create_test_app(1).await;
    let (_, body) = get_json(app, "/api/posts/recent?limit=1").await;
    let post = &body[0];
    assert_eq!(post["platform"], "twitter");
    assert_eq!(post["category"], "gaming");
    assert!(post["sentiment"].is_string());
    assert!(post["sentiment_score"].is_number());
}

#[tokio::test]
async fn category_sentiment_lists_observed_categories() {
    let (app, _) = create_test_app(1).await;
    let (status, body) = get_json(app, "/api/sentiment/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("gaming").is_some(), "body: {body}");
}

#[tokio::test]
async fn collection_stats_include_last_reports() {
    let (app, _) = create_test_app(2).await;
    let (status, body) = get_json(app, "/api/collection/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection"]["total_collections"], 2);
    assert_eq!(body["collection"]["total_posts"], 60);
    assert_eq!(body["scoring"]["total_analyzed"], 60);
    assert_eq!(body["last_reports"][0]["source"], "thirty");
    assert_eq!(body["last_reports"][0]["status"], "succeeded");
}

// ============================================================================
// Control endpoints
// ============================================================================

#[tokio::test]
async fn start_then_stop_reports_loop_state() {
    let (app, controller) = create_test_app(0).await;

    let (status, body) = post_json(app.clone(), "/api/control/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "start");
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["loop"]["status"], "running");
    assert_eq!(body["loop"]["shutting_down"], false);
    assert!(body["version"].is_string());

    let (_, body) = post_json(app.clone(), "/api/control/start").await;
    assert_eq!(body["data"]["changed"], false);
    assert_eq!(body["data"]["message"], "Cycle loop already running");

    let (status, body) = post_json(app.clone(), "/api/control/stop").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "stop");
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["loop"]["status"], "stopped");

    let (_, body) = post_json(app, "/api/control/stop").await;
    assert_eq!(body["data"]["changed"], false);

    controller.shutdown().await;
}

#[tokio::test]
async fn start_during_shutdown_is_unavailable() {
    let config = PulseConfig::default();
    let coordinator = PipelineCoordinator::new(&config, Vec::new()).unwrap();
    let shutdown = CancellationToken::new();
    let controller = Arc::new(CycleController::new(coordinator, shutdown.clone()));
    let (events, _) = broadcast::channel(16);
    let app = create_app(DashboardState::new(controller, events, config.server.clone()));

    shutdown.cancel();
    let (status, body) = post_json(app, "/api/control/start").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SHUTTING_DOWN");
    assert_eq!(body["loop"]["status"], "idle");
    assert_eq!(body["loop"]["shutting_down"], true);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _) = create_test_app(0).await;
    let (status, _) = get_json(app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
