//! Social Pulse - Social Business Intelligence Pipeline
//!
//! Collects posts from every platform source, scores them, detects keyword
//! trends and serves the results over HTTP and WebSocket.
//!
//! # Usage
//!
//! ```bash
//! # Serve the dashboard API, start cycling on POST /api/control/start
//! cargo run --release
//!
//! # Start cycling immediately, every 10 seconds, reproducible data
//! cargo run --release -- --autostart --interval 10 --seed 42
//! ```
//!
//! # Environment Variables
//!
//! - `PULSE_CONFIG`: Path to a TOML config file (default: `./pulse_config.toml`)
//! - `PULSE_SERVER_ADDR`: Bind address (default: `0.0.0.0:5000`)
//! - `PULSE_CORS_ORIGINS`: Comma-separated extra CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use social_pulse::api::{create_app, DashboardState};
use social_pulse::config::{defaults::EVENT_CHANNEL_CAPACITY, PulseConfig};
use social_pulse::pipeline::{BroadcastPublisher, CycleController, PipelineCoordinator};
use social_pulse::sources::simulated_sources;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "social-pulse")]
#[command(about = "Social Pulse Business Intelligence Pipeline")]
#[command(version)]
struct CliArgs {
    /// Server address (overrides [server].addr)
    #[arg(long, env = "PULSE_SERVER_ADDR")]
    addr: Option<String>,

    /// Config file (overrides PULSE_CONFIG and ./pulse_config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between cycles (overrides [cycle].update_interval_secs)
    #[arg(long)]
    interval: Option<u64>,

    /// Start the cycle loop at startup
    #[arg(long)]
    autostart: bool,

    /// Seed the simulated sources for reproducible data
    #[arg(long)]
    seed: Option<u64>,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    CycleSupervisor,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpServer => write!(f, "HttpServer"),
            Self::CycleSupervisor => write!(f, "CycleSupervisor"),
        }
    }
}

// ============================================================================
// Startup
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Load config from `--config`, `PULSE_CONFIG`, `./pulse_config.toml` or
/// defaults, then apply CLI overrides.
fn load_config(args: &CliArgs) -> Result<PulseConfig> {
    let mut config = match &args.config {
        Some(path) => PulseConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PulseConfig::load().context("loading pulse configuration")?,
    };

    if let Some(addr) = &args.addr {
        config.server.addr.clone_from(addr);
    }
    if let Some(interval) = args.interval {
        config.cycle.update_interval_secs = interval;
    }
    if args.autostart {
        config.cycle.autostart = true;
    }
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }

    config.validate().context("invalid configuration after CLI overrides")?;
    Ok(config)
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Spawn the task that drains the cycle loop once shutdown begins.
fn spawn_cycle_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    controller: Arc<CycleController>,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        cancel_token.cancelled().await;
        info!("[CycleSupervisor] Waiting for in-flight cycle to finish");
        controller.shutdown().await;
        Ok(TaskName::CycleSupervisor)
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("🔒 Supervisor: All tasks spawned, monitoring...");

    loop {
        match task_set.join_next().await {
            Some(Ok(Ok(task_name))) => {
                info!("🔒 Supervisor: Task {} completed normally", task_name);
            }
            Some(Ok(Err(e))) => {
                error!("🔒 Supervisor: Task failed with error: {}", e);
                cancel_token.cancel();
                return Err(e);
            }
            Some(Err(e)) => {
                error!("🔒 Supervisor: Task panicked: {}", e);
                cancel_token.cancel();
                return Err(anyhow::anyhow!("Task panicked: {}", e));
            }
            None => {
                info!("🔒 Supervisor: All tasks completed");
                break;
            }
        }
    }

    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    let config = load_config(&args)?;

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("🚀 Starting Social Pulse Business Intelligence Pipeline");
    info!("");
    info!("   Phase 1: Collecting (4 platform sources, concurrent)");
    info!("   Phase 2: Scoring (hybrid sentiment, {} workers)", config.scoring.max_workers);
    info!("   Phase 3: Aggregating ({} trend keywords)", config.trends.keywords.len());
    info!("   Phase 4: Publishing (snapshot + WebSocket events)");
    info!("   Cycle interval: {}s", config.cycle.update_interval_secs);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let cancel_token = CancellationToken::new();
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let coordinator = PipelineCoordinator::new(&config, simulated_sources(&config.simulation))
        .context("initializing pipeline coordinator")?
        .with_publisher(Box::new(BroadcastPublisher::new(events.clone())));
    let controller = Arc::new(CycleController::new(coordinator, cancel_token.clone()));

    if config.cycle.autostart {
        controller.start();
    }

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("binding {}", config.server.addr))?;
    info!("🌐 Dashboard API listening on http://{}", config.server.addr);

    let app = create_app(DashboardState::new(
        Arc::clone(&controller),
        events,
        config.server.clone(),
    ));

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    spawn_cycle_supervisor(&mut task_set, Arc::clone(&controller), cancel_token.clone());

    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Ctrl+C received, shutting down");
                signal_token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    run_supervisor(&mut task_set, cancel_token).await?;
    info!("👋 Social Pulse stopped");
    Ok(())
}
