//! Collection Orchestrator - concurrent fan-out over every post source
//!
//! Each source runs on its own tokio task under a per-source timeout, and
//! the whole fan-out shares one overall deadline. A source that errors,
//! panics, or overruns either bound contributes nothing and is reported;
//! it never disturbs the other sources.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::CollectionConfig;
use crate::sources::PostSource;
use crate::types::{Platform, Post};

// ============================================================================
// Per-Source Reports
// ============================================================================

/// How a single source fared in one fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Succeeded,
    Failed { error: String },
    TimedOut,
}

/// Per-source result line for one fan-out.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub platform: Platform,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
    pub posts: usize,
    pub elapsed_ms: u64,
}

/// Merged output of one fan-out.
#[derive(Debug, Clone, Default)]
pub struct CollectionBatch {
    pub posts: Vec<Post>,
    pub reports: Vec<SourceReport>,
    pub elapsed: Duration,
}

impl CollectionBatch {
    pub fn failed_sources(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome != SourceOutcome::Succeeded)
            .count()
    }
}

// ============================================================================
// Lifetime Statistics
// ============================================================================

/// Cumulative tallies for one source.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SourceTally {
    pub total_posts: u64,
    /// Successful collections
    pub collections: u64,
    pub failures: u64,
    pub timeouts: u64,
}

/// Lifetime collection statistics. Only ever grows until restart.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectorStats {
    pub total_collections: u64,
    pub total_posts: u64,
    /// Running mean fan-out duration (seconds)
    pub average_time_secs: f64,
    /// Sources that failed or timed out, summed over all fan-outs
    pub error_count: u64,
    pub per_source: BTreeMap<String, SourceTally>,
}

impl CollectorStats {
    fn record(&mut self, batch: &CollectionBatch) {
        self.total_collections += 1;
        self.total_posts += batch.posts.len() as u64;
        let n = self.total_collections as f64;
        self.average_time_secs += (batch.elapsed.as_secs_f64() - self.average_time_secs) / n;

        for report in &batch.reports {
            let tally = self.per_source.entry(report.source.clone()).or_default();
            match report.outcome {
                SourceOutcome::Succeeded => {
                    tally.collections += 1;
                    tally.total_posts += report.posts as u64;
                }
                SourceOutcome::Failed { .. } => {
                    tally.failures += 1;
                    self.error_count += 1;
                }
                SourceOutcome::TimedOut => {
                    tally.timeouts += 1;
                    self.error_count += 1;
                }
            }
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs all sources concurrently and merges their output.
pub struct CollectionOrchestrator {
    overall_timeout: Duration,
    per_source_timeout: Duration,
    stats: CollectorStats,
}

impl CollectionOrchestrator {
    pub fn new(config: &CollectionConfig) -> Self {
        Self::with_timeouts(config.overall_timeout(), config.per_source_timeout())
    }

    pub fn with_timeouts(overall_timeout: Duration, per_source_timeout: Duration) -> Self {
        Self {
            overall_timeout,
            per_source_timeout,
            stats: CollectorStats::default(),
        }
    }

    pub const fn stats(&self) -> &CollectorStats {
        &self.stats
    }

    /// Collect from every source concurrently.
    ///
    /// Successful batches are concatenated in source order. Outside a tokio
    /// runtime nothing can be spawned, so an empty batch is returned.
    pub async fn collect_all(&mut self, sources: &[Arc<dyn PostSource>]) -> CollectionBatch {
        let started = Instant::now();

        if tokio::runtime::Handle::try_current().is_err() {
            error!("[Collector] No async runtime available, skipping collection");
            return CollectionBatch::default();
        }

        let deadline = tokio::time::Instant::now() + self.overall_timeout;
        let per_source = self.per_source_timeout;

        let handles: Vec<_> = sources
            .iter()
            .map(|source| {
                let task_source = Arc::clone(source);
                let handle = tokio::spawn(async move {
                    let task_started = Instant::now();
                    let result = tokio::time::timeout(per_source, task_source.collect()).await;
                    (result, task_started.elapsed())
                });
                (source.name().to_string(), source.platform(), handle)
            })
            .collect();

        let mut batch = CollectionBatch::default();

        for (name, platform, mut handle) in handles {
            let (outcome, items, elapsed) =
                match tokio::time::timeout_at(deadline, &mut handle).await {
                    Ok(Ok((Ok(Ok(posts)), elapsed))) => {
                        let n = posts.len();
                        batch.posts.extend(posts);
                        (SourceOutcome::Succeeded, n, elapsed)
                    }
                    Ok(Ok((Ok(Err(e)), elapsed))) => {
                        (SourceOutcome::Failed { error: e.to_string() }, 0, elapsed)
                    }
                    Ok(Ok((Err(_), elapsed))) => (SourceOutcome::TimedOut, 0, elapsed),
                    Ok(Err(join_err)) => {
                        let error = if join_err.is_panic() {
                            "source panicked".to_string()
                        } else {
                            join_err.to_string()
                        };
                        (SourceOutcome::Failed { error }, 0, started.elapsed())
                    }
                    Err(_) => {
                        handle.abort();
                        (SourceOutcome::TimedOut, 0, started.elapsed())
                    }
                };

            match &outcome {
                SourceOutcome::Succeeded => info!(
                    source = %name,
                    posts = items,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "[Collector] ✓ source collected"
                ),
                SourceOutcome::Failed { error } => warn!(
                    source = %name,
                    error = %error,
                    "[Collector] source failed, contributing 0 posts"
                ),
                SourceOutcome::TimedOut => warn!(
                    source = %name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "[Collector] source timed out, contributing 0 posts"
                ),
            }

            batch.reports.push(SourceReport {
                source: name,
                platform,
                outcome,
                posts: items,
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        batch.elapsed = started.elapsed();
        self.stats.record(&batch);

        info!(
            posts = batch.posts.len(),
            sources = batch.reports.len(),
            failed = batch.failed_sources(),
            elapsed_ms = batch.elapsed.as_millis() as u64,
            "[Collector] Collection complete"
        );

        batch
    }
}
