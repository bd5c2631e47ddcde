//! Snapshot publication.
//!
//! After every cycle the coordinator hands a [`CycleUpdate`] to each
//! registered [`SnapshotPublisher`]. Delivery is best-effort: a failing
//! publisher is logged by the coordinator and never stops the loop.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use super::state::{CycleSnapshot, PerformanceCounters, RunStatus};
use crate::analysis::ScorerStats;
use crate::collection::{CollectorStats, SourceReport};
use crate::types::{BusinessCategory, CategorySentiment, Post, SentimentSummary, TrendSignal};

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("subscriber channel closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

/// Everything a publisher gets to see about one finished cycle.
#[derive(Debug, Clone)]
pub struct CycleUpdate {
    pub snapshot: Arc<CycleSnapshot>,
    /// Tail of this cycle's newly scored posts
    pub new_posts: Vec<Post>,
    pub reports: Vec<SourceReport>,
}

pub trait SnapshotPublisher: Send + Sync {
    fn name(&self) -> &str;

    fn publish(&self, update: &CycleUpdate) -> Result<(), PublishError>;
}

// ============================================================================
// Dashboard Events
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatsPayload {
    pub iteration: u64,
    pub status: RunStatus,
    pub counters: PerformanceCounters,
    pub trends_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentPayload {
    pub summary: SentimentSummary,
    pub categories: BTreeMap<BusinessCategory, CategorySentiment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionPayload {
    pub collection: CollectorStats,
    pub scoring: ScorerStats,
    pub reports: Vec<SourceReport>,
}

/// One message on the dashboard event stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum DashboardEvent {
    SystemStats(SystemStatsPayload),
    SentimentUpdate(SentimentPayload),
    TrendsUpdate(Vec<TrendSignal>),
    NewPosts(Vec<Post>),
    CollectionStats(CollectionPayload),
}

impl DashboardEvent {
    /// Events describing one cycle, in emission order.
    ///
    /// `new_posts` is only emitted when the cycle produced posts.
    pub fn from_update(update: &CycleUpdate) -> Vec<Self> {
        let snapshot = &update.snapshot;
        let mut events = vec![
            Self::SystemStats(SystemStatsPayload {
                iteration: snapshot.iteration,
                status: RunStatus::Running,
                counters: snapshot.counters.clone(),
                trends_count: snapshot.trends.len(),
            }),
            Self::SentimentUpdate(SentimentPayload {
                summary: snapshot.summary.clone(),
                categories: snapshot.category_sentiment.clone(),
            }),
            Self::TrendsUpdate(snapshot.trends.clone()),
        ];
        if !update.new_posts.is_empty() {
            events.push(Self::NewPosts(update.new_posts.clone()));
        }
        events.push(Self::CollectionStats(CollectionPayload {
            collection: snapshot.collection.clone(),
            scoring: snapshot.scoring.clone(),
            reports: update.reports.clone(),
        }));
        events
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::SystemStats(_) => "system_stats",
            Self::SentimentUpdate(_) => "sentiment_update",
            Self::TrendsUpdate(_) => "trends_update",
            Self::NewPosts(_) => "new_posts",
            Self::CollectionStats(_) => "collection_stats",
        }
    }
}

// ============================================================================
// Broadcast Publisher
// ============================================================================

/// Fans dashboard events out to every WebSocket subscriber.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<DashboardEvent>,
}

impl BroadcastPublisher {
    pub const fn new(tx: broadcast::Sender<DashboardEvent>) -> Self {
        Self { tx }
    }
}

impl SnapshotPublisher for BroadcastPublisher {
    fn name(&self) -> &str {
        "websocket-broadcast"
    }

    fn publish(&self, update: &CycleUpdate) -> Result<(), PublishError> {
        if self.tx.receiver_count() == 0 {
            debug!("[Publisher] No subscribers, skipping broadcast");
            return Ok(());
        }
        for event in DashboardEvent::from_update(update) {
            self.tx.send(event).map_err(|_| PublishError::Closed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BusinessCategory, Platform};

    fn update(new_posts: Vec<Post>) -> CycleUpdate {
        CycleUpdate {
            snapshot: Arc::new(CycleSnapshot::default()),
            new_posts,
            reports: Vec::new(),
        }
    }

    #[test]
    fn test_new_posts_event_only_when_non_empty() {
        let names: Vec<_> = DashboardEvent::from_update(&update(Vec::new()))
            .iter()
            .map(DashboardEvent::name)
            .collect();
        assert_eq!(names, vec!["system_stats", "sentiment_update", "trends_update", "collection_stats"]);

        let post = Post::new("p", Platform::Reddit, BusinessCategory::Gaming, "gg");
        assert_eq!(DashboardEvent::from_update(&update(vec![post])).len(), 5);
    }

    #[test]
    fn test_event_wire_shape() {
        let event = DashboardEvent::TrendsUpdate(Vec::new());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "trends_update");
        assert!(json["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_broadcast_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(16);
        let publisher = BroadcastPublisher::new(tx);
        publisher.publish(&update(Vec::new())).unwrap();
        let first = rx.try_recv().unwrap();
        assert_eq!(first.name(), "system_stats");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let (tx, rx) = broadcast::channel(16);
        drop(rx);
        assert!(BroadcastPublisher::new(tx).publish(&update(Vec::new())).is_ok());
    }
}
