//! API route definitions
//!
//! - /api/health - liveness and loop status
//! - /api/stats - counters and sentiment summary
//! - /api/trends - latest ranked trends
//! - /api/posts/recent - newest posts of the active window
//! - /api/sentiment/categories - per-category sentiment split
//! - /api/collection/stats - collector and scorer statistics
//! - /api/control/{start,stop} - cycle loop control
//! - /ws - dashboard event stream

use axum::{routing::{get, post}, Router};

use super::handlers::{self, DashboardState};

/// Create all `/api` routes
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/stats", get(handlers::get_stats))
        .route("/trends", get(handlers::get_trends))
        .route("/posts/recent", get(handlers::get_recent_posts))
        .route("/sentiment/categories", get(handlers::get_category_sentiment))
        .route("/collection/stats", get(handlers::get_collection_stats))
        // Cycle control
        .route("/control/start", post(handlers::start_cycles))
        .route("/control/stop", post(handlers::stop_cycles))
        .with_state(state)
}

/// WebSocket event stream at the root level
pub fn ws_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/ws", get(handlers::ws_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PulseConfig, ServerConfig};
    use crate::pipeline::{CycleController, PipelineCoordinator};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn create_test_state() -> DashboardState {
        let coordinator = PipelineCoordinator::new(&PulseConfig::default(), Vec::new()).unwrap();
        let controller = Arc::new(CycleController::new(coordinator, CancellationToken::new()));
        let (events, _) = broadcast::channel(16);
        DashboardState::new(controller, events, ServerConfig::default())
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = api_routes(create_test_state());
        let resp = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_control_routes_reject_get() {
        let app = api_routes(create_test_state());
        let resp = app
            .oneshot(Request::builder().uri("/control/start").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_ws_requires_upgrade() {
        let app = ws_routes(create_test_state());
        let resp = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
