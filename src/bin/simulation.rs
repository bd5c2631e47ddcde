//! Headless Pipeline Simulation
//!
//! Runs a fixed number of back-to-back cycles against the simulated platform
//! sources, with no HTTP server and no sleeping between cycles. Prints one
//! JSON line per cycle on stdout; the briefing and top trends go to stderr.
//!
//! # Usage
//! ```bash
//! ./simulation --cycles 20 --seed 7 | jq .trends
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use social_pulse::config::PulseConfig;
use social_pulse::pipeline::{CycleReport, PipelineCoordinator};
use social_pulse::sources::simulated_sources;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "simulation")]
#[command(about = "Headless Social Pulse cycle simulation")]
#[command(version)]
struct Args {
    /// Number of cycles to run
    #[arg(short, long, default_value = "5")]
    cycles: u64,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Suppress the briefing and per-cycle trend lines on stderr
    #[arg(short, long)]
    quiet: bool,

    /// Config file (defaults to PULSE_CONFIG / ./pulse_config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// One stdout line.
#[derive(Serialize)]
struct CycleLine<'a> {
    #[serde(flatten)]
    report: &'a CycleReport,
    top_trends: Vec<&'a str>,
}

fn log_mission(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PulseConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PulseConfig::load().context("loading pulse configuration")?,
    };
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    // Latency would only slow the run down.
    config.simulation.min_delay_ms = 0;
    config.simulation.max_delay_ms = 0;

    log_mission(&"=".repeat(70), args.quiet);
    log_mission("SOCIAL PULSE CYCLE SIMULATION", args.quiet);
    log_mission(&"=".repeat(70), args.quiet);
    log_mission(&format!("  Cycles: {}", args.cycles), args.quiet);
    if let Some(seed) = config.simulation.seed {
        log_mission(&format!("  Random seed: {seed}"), args.quiet);
    }
    log_mission(&format!("  Keywords: {}", config.trends.keywords.len()), args.quiet);
    log_mission(&format!("  Scoring workers: {}", config.scoring.max_workers), args.quiet);
    log_mission(&"=".repeat(70), args.quiet);

    let mut coordinator = PipelineCoordinator::new(&config, simulated_sources(&config.simulation))
        .context("initializing pipeline coordinator")?;

    let started = Instant::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for _ in 0..args.cycles {
        let report = coordinator.run_cycle().await.context("cycle failed")?;
        let snapshot = coordinator.snapshot();
        let top_trends: Vec<&str> = snapshot.trends.iter().take(3).map(|t| t.name.as_str()).collect();

        let line = serde_json::to_string(&CycleLine { report: &report, top_trends: top_trends.clone() })?;
        writeln!(out, "{line}")?;

        if !top_trends.is_empty() {
            log_mission(
                &format!("[cycle {:>3}] trending: {}", report.iteration, top_trends.join(", ")),
                args.quiet,
            );
        }
    }
    out.flush()?;

    let snapshot = coordinator.snapshot();
    log_mission(&"=".repeat(70), args.quiet);
    log_mission(
        &format!(
            "SIMULATION COMPLETE: {} cycles, {} posts in history, {:.2}s",
            snapshot.iteration,
            snapshot.counters.posts_in_history,
            started.elapsed().as_secs_f64()
        ),
        args.quiet,
    );
    log_mission(
        &format!("  Average sentiment score: {:+.3}", snapshot.summary.average_score),
        args.quiet,
    );
    log_mission(&"=".repeat(70), args.quiet);

    Ok(())
}
