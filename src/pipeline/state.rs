//! Cycle State and Snapshots
//!
//! `CycleState` is owned by the coordinator and mutated only between phases
//! of a cycle. Readers never see it directly: after every cycle the
//! coordinator builds an immutable [`CycleSnapshot`] and publishes it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::analysis::ScorerStats;
use crate::collection::{CollectorStats, SourceReport};
use crate::types::{
    BusinessCategory, CategorySentiment, Platform, Post, SentimentSummary, TrendSignal,
};

// ============================================================================
// Phases
// ============================================================================

/// Where the cycle loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    Collecting,
    Scoring,
    Aggregating,
    Publishing,
    Sleeping,
    Stopped,
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Collecting => write!(f, "COLLECTING"),
            Self::Scoring => write!(f, "SCORING"),
            Self::Aggregating => write!(f, "AGGREGATING"),
            Self::Publishing => write!(f, "PUBLISHING"),
            Self::Sleeping => write!(f, "SLEEPING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Coarse lifecycle of the cycle loop, as reported to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Stopped,
}

// ============================================================================
// Counters
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct PerformanceCounters {
    /// Completed cycles since start
    pub iterations: u64,
    pub posts_in_history: usize,
    pub posts_in_window: usize,
    pub last_cycle_ms: u64,
    /// New posts per second over the last cycle
    pub processing_speed: f64,
    pub uptime_secs: u64,
    /// Posts pruned from history since start
    pub evicted_total: u64,
    /// Posts collected per platform since start
    pub per_platform: BTreeMap<Platform, u64>,
}

// ============================================================================
// Mutable Cycle State
// ============================================================================

/// Everything the coordinator carries from one cycle to the next.
pub struct CycleState {
    /// All retained posts, oldest first
    pub history: Vec<Post>,
    /// Oldest `created_at` inside the active window
    pub window_cutoff: DateTime<Utc>,
    pub trends: Vec<TrendSignal>,
    pub summary: SentimentSummary,
    pub categories: BTreeMap<BusinessCategory, CategorySentiment>,
    pub counters: PerformanceCounters,
    /// When the current run was started. Unset until the first start or cycle.
    pub started: Option<Instant>,
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            window_cutoff: DateTime::<Utc>::MIN_UTC,
            trends: Vec::new(),
            summary: SentimentSummary::empty(),
            categories: BTreeMap::new(),
            counters: PerformanceCounters::default(),
            started: None,
        }
    }

    /// Seconds since the current run was started, 0 before any start.
    pub fn uptime_secs(&self) -> u64 {
        self.started.map_or(0, |at| at.elapsed().as_secs())
    }

    /// Drop posts created before `cutoff`. Returns how many were evicted.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.history.len();
        self.history.retain(|p| p.created_at >= cutoff);
        before - self.history.len()
    }

    /// Posts inside the active window, in history order.
    pub fn active_window(&self) -> impl Iterator<Item = &Post> + '_ {
        let cutoff = self.window_cutoff;
        self.history.iter().filter(move |p| p.created_at >= cutoff)
    }

    /// Newest `limit` posts of the active window, newest first.
    pub fn recent_posts(&self, limit: usize) -> Vec<Post> {
        let mut window: Vec<&Post> = self.active_window().collect();
        window.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        window.into_iter().take(limit).cloned().collect()
    }
}

impl Default for CycleState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Published Snapshot
// ============================================================================

/// Immutable view of the pipeline after a cycle.
///
/// Replaced wholesale every cycle; readers hold an `Arc` to whichever
/// snapshot was current when they loaded it.
#[derive(Debug, Clone, Serialize)]
pub struct CycleSnapshot {
    pub iteration: u64,
    pub trends: Vec<TrendSignal>,
    pub summary: SentimentSummary,
    pub counters: PerformanceCounters,
    /// Newest posts of the active window, newest first
    pub recent_posts: Vec<Post>,
    pub category_sentiment: BTreeMap<BusinessCategory, CategorySentiment>,
    pub collection: CollectorStats,
    pub scoring: ScorerStats,
    pub last_reports: Vec<SourceReport>,
    pub published_at: DateTime<Utc>,
}

impl Default for CycleSnapshot {
    fn default() -> Self {
        Self {
            iteration: 0,
            trends: Vec::new(),
            summary: SentimentSummary::empty(),
            counters: PerformanceCounters::default(),
            recent_posts: Vec::new(),
            category_sentiment: BTreeMap::new(),
            collection: CollectorStats::default(),
            scoring: ScorerStats::default(),
            last_reports: Vec::new(),
            published_at: Utc::now(),
        }
    }
}
