//! Pipeline Coordinator - one collection → scoring → trends cycle
//!
//! ```text
//! PHASE 1: Collecting   (all sources concurrently, bounded wait)
//! PHASE 2: Scoring      (new batch only, rayon pool via spawn_blocking)
//! PHASE 3: Aggregating  (trend detection against previous volumes)
//! PHASE 4: Publishing   (history, window, summary, counters, snapshot)
//! ```
//!
//! The coordinator is the single writer of cycle state. Readers only ever
//! see the immutable snapshot it publishes at the end of each cycle.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{info, warn};

use super::publisher::{CycleUpdate, SnapshotPublisher};
use super::state::{CyclePhase, CycleSnapshot, CycleState};
use crate::analysis::{category_breakdown, summarize, ScoringEngine, ScoringError};
use crate::collection::CollectionOrchestrator;
use crate::config::{CycleConfig, PulseConfig};
use crate::sources::PostSource;
use crate::trends::{TrendAggregator, TrendError, VolumeMap};

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("scoring engine setup failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("trend aggregator setup failed: {0}")]
    Trends(#[from] TrendError),

    #[error("scoring task failed: {0}")]
    ScoringTask(#[from] tokio::task::JoinError),
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub iteration: u64,
    /// Posts collected and scored this cycle
    pub new_posts: usize,
    pub history: usize,
    pub window: usize,
    pub trends: usize,
    /// Posts pruned this cycle (non-zero only on prune cycles)
    pub evicted: usize,
    pub degraded: usize,
    pub lost: usize,
    pub failed_sources: usize,
    pub elapsed_ms: u64,
}

pub struct PipelineCoordinator {
    sources: Vec<Arc<dyn PostSource>>,
    collector: CollectionOrchestrator,
    scorer: Arc<ScoringEngine>,
    trends: TrendAggregator,
    /// Keyword volumes carried into the next cycle
    volumes: VolumeMap,
    state: CycleState,
    config: CycleConfig,
    publishers: Vec<Box<dyn SnapshotPublisher>>,
    snapshot: Arc<ArcSwap<CycleSnapshot>>,
    phase: Arc<watch::Sender<CyclePhase>>,
}

impl PipelineCoordinator {
    pub fn new(config: &PulseConfig, sources: Vec<Arc<dyn PostSource>>) -> Result<Self, CycleError> {
        info!(
            sources = sources.len(),
            keywords = config.trends.keywords.len(),
            workers = config.scoring.max_workers,
            "Initializing Pipeline Coordinator"
        );
        let (phase, _) = watch::channel(CyclePhase::Idle);

        Ok(Self {
            sources,
            collector: CollectionOrchestrator::new(&config.collection),
            scorer: Arc::new(ScoringEngine::new(&config.scoring)?),
            trends: TrendAggregator::new(&config.trends)?,
            volumes: VolumeMap::new(),
            state: CycleState::new(),
            config: config.cycle.clone(),
            publishers: Vec::new(),
            snapshot: Arc::new(ArcSwap::from_pointee(CycleSnapshot::default())),
            phase: Arc::new(phase),
        })
    }

    /// Replace the scoring engine.
    #[must_use]
    pub fn with_scoring_engine(mut self, engine: ScoringEngine) -> Self {
        self.scorer = Arc::new(engine);
        self
    }

    /// Register a publisher notified after every cycle.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Box<dyn SnapshotPublisher>) -> Self {
        info!(publisher = publisher.name(), "[Coordinator] Publisher registered");
        self.publishers.push(publisher);
        self
    }

    /// Shared handle readers load snapshots from.
    pub fn snapshot_handle(&self) -> Arc<ArcSwap<CycleSnapshot>> {
        Arc::clone(&self.snapshot)
    }

    pub fn snapshot(&self) -> Arc<CycleSnapshot> {
        self.snapshot.load_full()
    }

    pub fn phase_handle(&self) -> Arc<watch::Sender<CyclePhase>> {
        Arc::clone(&self.phase)
    }

    pub fn phase_receiver(&self) -> watch::Receiver<CyclePhase> {
        self.phase.subscribe()
    }

    pub const fn state(&self) -> &CycleState {
        &self.state
    }

    pub const fn volumes(&self) -> &VolumeMap {
        &self.volumes
    }

    pub const fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Record the start of a run. Uptime is measured from `at`.
    pub fn mark_started(&mut self, at: Instant) {
        self.state.started = Some(at);
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.phase.send_replace(phase);
    }

    /// Run one full cycle and publish its snapshot.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CycleError> {
        let started = Instant::now();
        let iteration = self.state.counters.iterations + 1;
        self.state.started.get_or_insert(started);

        // PHASE 1: collect
        self.set_phase(CyclePhase::Collecting);
        let batch = self.collector.collect_all(&self.sources).await;
        let failed_sources = batch.failed_sources();
        let reports = batch.reports;

        // PHASE 2: score the new batch only
        self.set_phase(CyclePhase::Scoring);
        let scorer = Arc::clone(&self.scorer);
        let posts = batch.posts;
        let scored = tokio::task::spawn_blocking(move || scorer.score_batch(posts)).await?;

        // PHASE 3: trends
        self.set_phase(CyclePhase::Aggregating);
        let detection = self.trends.detect(&scored.posts, &self.volumes);
        self.volumes = detection.volumes;
        self.state.trends = detection.signals;

        // PHASE 4: fold into history and publish
        self.set_phase(CyclePhase::Publishing);
        let new_posts = scored.posts.len();
        let tail_from = new_posts.saturating_sub(self.config.new_posts_tail);
        let tail = scored.posts[tail_from..].to_vec();

        for post in &scored.posts {
            *self.state.counters.per_platform.entry(post.platform).or_default() += 1;
        }
        self.state.history.extend(scored.posts);

        let now = Utc::now();
        let evicted = if iteration % self.config.prune_every.max(1) == 0 {
            let cutoff = cutoff(now, self.config.retention());
            let evicted = self.state.prune(cutoff);
            info!(iteration, evicted, retained = self.state.history.len(), "[Coordinator] 🧹 History pruned");
            evicted
        } else {
            0
        };

        self.state.window_cutoff = cutoff(now, self.config.active_window());
        self.state.summary = summarize(self.state.active_window());
        self.state.categories = category_breakdown(self.state.active_window());

        let elapsed = started.elapsed();
        let uptime_secs = self.state.uptime_secs();
        let counters = &mut self.state.counters;
        counters.iterations = iteration;
        counters.posts_in_history = self.state.history.len();
        counters.posts_in_window = self.state.summary.total_posts;
        counters.last_cycle_ms = elapsed.as_millis() as u64;
        counters.processing_speed = if elapsed.as_secs_f64() > 0.0 {
            new_posts as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        counters.uptime_secs = uptime_secs;
        counters.evicted_total += evicted as u64;

        let snapshot = Arc::new(CycleSnapshot {
            iteration,
            trends: self.state.trends.clone(),
            summary: self.state.summary.clone(),
            counters: self.state.counters.clone(),
            recent_posts: self.state.recent_posts(self.config.recent_capacity),
            category_sentiment: self.state.categories.clone(),
            collection: self.collector.stats().clone(),
            scoring: self.scorer.stats(),
            last_reports: reports.clone(),
            published_at: now,
        });
        self.snapshot.store(Arc::clone(&snapshot));

        let update = CycleUpdate { snapshot, new_posts: tail, reports };
        for publisher in &self.publishers {
            if let Err(e) = publisher.publish(&update) {
                warn!(publisher = publisher.name(), error = %e, "[Coordinator] Publish failed");
            }
        }

        let report = CycleReport {
            iteration,
            new_posts,
            history: self.state.history.len(),
            window: self.state.summary.total_posts,
            trends: self.state.trends.len(),
            evicted,
            degraded: scored.degraded,
            lost: scored.lost,
            failed_sources,
            elapsed_ms: elapsed.as_millis() as u64,
        };

        info!(
            iteration,
            new_posts,
            history = report.history,
            window = report.window,
            trends = report.trends,
            elapsed_ms = report.elapsed_ms,
            "[Coordinator] 🔄 Cycle complete"
        );

        self.set_phase(CyclePhase::Sleeping);
        Ok(report)
    }
}

/// `now - span`, saturating at the earliest representable instant.
fn cutoff(now: DateTime<Utc>, span: chrono::Duration) -> DateTime<Utc> {
    now.checked_sub_signed(span).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
