//! Envelope for the cycle control endpoints.
//!
//! Every control reply carries the loop state the request left behind, so a
//! dashboard can redraw its start/stop controls from the reply alone:
//!
//! ```text
//! { "data":  { "action": "start", "changed": true, "message": "..." },
//!   "loop":  { "status": "running", "phase": "collecting", "iteration": 0, ... },
//!   "timestamp": "...", "version": "0.1.0" }
//! ```
//!
//! Rejected requests carry `"error": { "code", "message" }` in place of `data`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pipeline::{CycleController, CyclePhase, RunStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    Start,
    Stop,
}

impl ControlAction {
    const fn message(self, changed: bool) -> &'static str {
        match (self, changed) {
            (Self::Start, true) => "Cycle loop started",
            (Self::Start, false) => "Cycle loop already running",
            (Self::Stop, true) => "Cycle loop stopping",
            (Self::Stop, false) => "Cycle loop not running",
        }
    }
}

/// Loop state observed right after the request was applied.
#[derive(Debug, Clone, Serialize)]
pub struct LoopState {
    pub status: RunStatus,
    pub phase: CyclePhase,
    /// Last published iteration
    pub iteration: u64,
    pub shutting_down: bool,
}

impl LoopState {
    pub fn of(controller: &CycleController) -> Self {
        Self {
            status: controller.status(),
            phase: controller.phase(),
            iteration: controller.snapshot().iteration,
            shutting_down: controller.is_shutting_down(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControlOutcome {
    pub action: ControlAction,
    /// Whether this request changed the loop state
    pub changed: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ControlRejection {
    pub action: ControlAction,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlBody {
    Data(ControlOutcome),
    Error(ControlRejection),
}

#[derive(Debug, Serialize)]
pub struct ControlEnvelope {
    #[serde(flatten)]
    pub body: ControlBody,
    #[serde(rename = "loop")]
    pub loop_state: LoopState,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

impl ControlEnvelope {
    fn new(body: ControlBody, controller: &CycleController) -> Self {
        Self {
            body,
            loop_state: LoopState::of(controller),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// 200 reply for an applied action. A no-op still succeeds, with
    /// `changed: false`.
    pub fn applied(action: ControlAction, changed: bool, controller: &CycleController) -> Response {
        let outcome = ControlOutcome { action, changed, message: action.message(changed) };
        let body = Self::new(ControlBody::Data(outcome), controller);
        (StatusCode::OK, axum::Json(body)).into_response()
    }

    /// 503 reply: the process is shutting down and the loop cannot start.
    pub fn shutting_down(action: ControlAction, controller: &CycleController) -> Response {
        let rejection = ControlRejection {
            action,
            code: "SHUTTING_DOWN",
            message: "Service is shutting down".to_string(),
        };
        let body = Self::new(ControlBody::Error(rejection), controller);
        (StatusCode::SERVICE_UNAVAILABLE, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;
    use crate::pipeline::PipelineCoordinator;
    use tokio_util::sync::CancellationToken;

    fn controller(shutdown: CancellationToken) -> CycleController {
        let coordinator = PipelineCoordinator::new(&PulseConfig::default(), Vec::new()).unwrap();
        CycleController::new(coordinator, shutdown)
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_applied_carries_loop_state() {
        let controller = controller(CancellationToken::new());
        let resp = ControlEnvelope::applied(ControlAction::Stop, false, &controller);
        assert_eq!(resp.status(), StatusCode::OK);

        let v = body_json(resp).await;
        assert_eq!(v["data"]["action"], "stop");
        assert_eq!(v["data"]["changed"], false);
        assert_eq!(v["data"]["message"], "Cycle loop not running");
        assert_eq!(v["loop"]["status"], "idle");
        assert_eq!(v["loop"]["phase"], "idle");
        assert_eq!(v["loop"]["iteration"], 0);
        assert_eq!(v["version"], env!("CARGO_PKG_VERSION"));
        assert!(v.get("error").is_none());
    }

    #[tokio::test]
    async fn test_shutting_down_rejection() {
        let shutdown = CancellationToken::new();
        let controller = controller(shutdown.clone());
        shutdown.cancel();

        let resp = ControlEnvelope::shutting_down(ControlAction::Start, &controller);
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let v = body_json(resp).await;
        assert_eq!(v["error"]["code"], "SHUTTING_DOWN");
        assert_eq!(v["error"]["action"], "start");
        assert_eq!(v["loop"]["shutting_down"], true);
        assert!(v.get("data").is_none());
    }
}
