//! API route handlers
//!
//! Every read endpoint serves the latest published [`CycleSnapshot`]; none of
//! them touch the coordinator, so a slow cycle never delays a request.

use arc_swap::ArcSwap;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::envelope::{ControlAction, ControlEnvelope};
use crate::analysis::ScorerStats;
use crate::collection::{CollectorStats, SourceReport};
use crate::config::ServerConfig;
use crate::pipeline::{
    CycleController, CyclePhase, CycleSnapshot, DashboardEvent, PerformanceCounters, RunStatus,
};
use crate::types::{BusinessCategory, CategorySentiment, Post, SentimentSummary, TrendSignal};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    pub controller: Arc<CycleController>,
    pub snapshot: Arc<ArcSwap<CycleSnapshot>>,
    /// Dashboard event stream fed by the broadcast publisher
    pub events: broadcast::Sender<DashboardEvent>,
    pub server: ServerConfig,
}

impl DashboardState {
    pub fn new(
        controller: Arc<CycleController>,
        events: broadcast::Sender<DashboardEvent>,
        server: ServerConfig,
    ) -> Self {
        let snapshot = controller.snapshot_handle();
        Self { controller, snapshot, events, server }
    }
}

// ============================================================================
// Health & Stats
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub running: bool,
    pub phase: CyclePhase,
}

/// GET /api/health
pub async fn get_health(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
        running: state.controller.is_running(),
        phase: state.controller.phase(),
    })
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: RunStatus,
    pub running: bool,
    pub iteration: u64,
    pub counters: PerformanceCounters,
    pub sentiment: SentimentSummary,
    pub trends_count: usize,
    pub last_update: DateTime<Utc>,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<DashboardState>) -> Json<StatsResponse> {
    let snapshot = state.snapshot.load();
    let status = state.controller.status();
    Json(StatsResponse {
        status,
        running: status == RunStatus::Running,
        iteration: snapshot.iteration,
        counters: snapshot.counters.clone(),
        sentiment: snapshot.summary.clone(),
        trends_count: snapshot.trends.len(),
        last_update: snapshot.published_at,
    })
}

// ============================================================================
// Trends, Posts & Sentiment
// ============================================================================

/// GET /api/trends
pub async fn get_trends(State(state): State<DashboardState>) -> Json<Vec<TrendSignal>> {
    Json(state.snapshot.load().trends.clone())
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// GET /api/posts/recent?limit=N
///
/// Newest active-window posts first. `limit` defaults to 20 and is capped
/// at 100.
pub async fn get_recent_posts(
    State(state): State<DashboardState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<Post>> {
    let limit = query
        .limit
        .unwrap_or(state.server.recent_default_limit)
        .min(state.server.recent_max_limit);
    let snapshot = state.snapshot.load();
    Json(snapshot.recent_posts.iter().take(limit).cloned().collect())
}

/// GET /api/sentiment/categories
pub async fn get_category_sentiment(
    State(state): State<DashboardState>,
) -> Json<BTreeMap<BusinessCategory, CategorySentiment>> {
    Json(state.snapshot.load().category_sentiment.clone())
}

#[derive(Debug, Serialize)]
pub struct CollectionStatsResponse {
    pub collection: CollectorStats,
    pub scoring: ScorerStats,
    pub last_reports: Vec<SourceReport>,
}

/// GET /api/collection/stats
pub async fn get_collection_stats(
    State(state): State<DashboardState>,
) -> Json<CollectionStatsResponse> {
    let snapshot = state.snapshot.load();
    Json(CollectionStatsResponse {
        collection: snapshot.collection.clone(),
        scoring: snapshot.scoring.clone(),
        last_reports: snapshot.last_reports.clone(),
    })
}

// ============================================================================
// Control
// ============================================================================

/// POST /api/control/start
pub async fn start_cycles(State(state): State<DashboardState>) -> Response {
    let changed = state.controller.start();
    if !changed && state.controller.is_shutting_down() {
        return ControlEnvelope::shutting_down(ControlAction::Start, &state.controller);
    }
    ControlEnvelope::applied(ControlAction::Start, changed, &state.controller)
}

/// POST /api/control/stop
pub async fn stop_cycles(State(state): State<DashboardState>) -> Response {
    let changed = state.controller.stop();
    ControlEnvelope::applied(ControlAction::Stop, changed, &state.controller)
}

// ============================================================================
// WebSocket
// ============================================================================

/// GET /ws
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<DashboardState>) -> impl IntoResponse {
    let rx = state.events.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, rx))
}

/// Forward dashboard events to one client until either side hangs up.
async fn forward_events(mut socket: WebSocket, mut rx: broadcast::Receiver<DashboardEvent>) {
    info!("[WebSocket] Client connected");
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(event = event.name(), error = %e, "[WebSocket] Failed to encode event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "[WebSocket] Client lagging, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    info!("[WebSocket] Client disconnected");
}
