//! Cycle loop: run cycles back to back until cancelled.
//!
//! A failed or panicking cycle is logged and followed by the error backoff
//! instead of the regular interval; the loop itself never exits on a cycle
//! failure. Cancellation is checked before each cycle and during sleeps, so
//! an in-flight cycle always runs to completion.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::state::CyclePhase;
use super::PipelineCoordinator;

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub completed: u64,
    pub failed: u64,
}

pub struct CycleLoop {
    coordinator: Arc<Mutex<PipelineCoordinator>>,
    interval: Duration,
    backoff: Duration,
    cancel: CancellationToken,
    phase: Arc<watch::Sender<CyclePhase>>,
    max_cycles: Option<u64>,
    /// Stamped at construction, which is when the loop was requested
    started: Instant,
}

impl CycleLoop {
    pub fn new(
        coordinator: Arc<Mutex<PipelineCoordinator>>,
        phase: Arc<watch::Sender<CyclePhase>>,
        interval: Duration,
        backoff: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            coordinator,
            interval,
            backoff,
            cancel,
            phase,
            max_cycles: None,
            started: Instant::now(),
        }
    }

    /// Stop after `n` cycles (successful or not).
    #[must_use]
    pub const fn with_max_cycles(mut self, n: u64) -> Self {
        self.max_cycles = Some(n);
        self
    }

    pub async fn run(self) -> LoopSummary {
        let mut summary = LoopSummary::default();

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "🚀 Cycle loop started (interval {}s, backoff {}s)",
            self.interval.as_secs(),
            self.backoff.as_secs()
        );
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        self.coordinator.lock().await.mark_started(self.started);

        loop {
            if self.cancel.is_cancelled() {
                info!("[CycleLoop] Stop requested");
                break;
            }
            if self.max_cycles.is_some_and(|max| summary.completed + summary.failed >= max) {
                break;
            }

            let outcome = {
                let mut coordinator = self.coordinator.lock().await;
                AssertUnwindSafe(coordinator.run_cycle()).catch_unwind().await
            };

            let pause = match outcome {
                Ok(Ok(_)) => {
                    summary.completed += 1;
                    self.interval
                }
                Ok(Err(e)) => {
                    summary.failed += 1;
                    error!(error = %e, backoff_secs = self.backoff.as_secs(), "[CycleLoop] Cycle failed");
                    self.backoff
                }
                Err(_) => {
                    summary.failed += 1;
                    error!(backoff_secs = self.backoff.as_secs(), "[CycleLoop] Cycle panicked");
                    self.backoff
                }
            };

            self.phase.send_replace(CyclePhase::Sleeping);
            tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("[CycleLoop] Stop requested during sleep");
                    break;
                }
                () = tokio::time::sleep(pause) => {}
            }
        }

        self.phase.send_replace(CyclePhase::Stopped);

        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("📊 CYCLE LOOP STOPPED");
        info!("   Cycles completed: {}", summary.completed);
        info!("   Cycles failed:    {}", summary.failed);
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;
    use crate::pipeline::publisher::{CycleUpdate, PublishError, SnapshotPublisher};
    use crate::sources::{PostSource, SourceError};
    use crate::types::{BusinessCategory, Platform, Post};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Yields one post per call and counts calls.
    struct Counter(AtomicUsize);

    #[async_trait]
    impl PostSource for Counter {
        async fn collect(&self) -> Result<Vec<Post>, SourceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Post::new("p", Platform::Twitter, BusinessCategory::Business, "hello")])
        }

        fn name(&self) -> &str {
            "counter"
        }

        fn platform(&self) -> Platform {
            Platform::Twitter
        }
    }

    enum Misbehaviour {
        Panic,
        Reject,
    }

    struct BadPublisher(Misbehaviour);

    impl SnapshotPublisher for BadPublisher {
        fn name(&self) -> &str {
            "bad"
        }

        fn publish(&self, _update: &CycleUpdate) -> Result<(), PublishError> {
            match self.0 {
                Misbehaviour::Panic => panic!("publisher exploded"),
                Misbehaviour::Reject => Err(PublishError::Closed),
            }
        }
    }

    fn misbehaving(misbehaviour: Misbehaviour) -> (Arc<Counter>, PipelineCoordinator) {
        let source = Arc::new(Counter(AtomicUsize::new(0)));
        let coordinator =
            PipelineCoordinator::new(&PulseConfig::default(), vec![source.clone() as Arc<dyn PostSource>])
                .unwrap()
                .with_publisher(Box::new(BadPublisher(misbehaviour)));
        (source, coordinator)
    }

    fn shared(coordinator: PipelineCoordinator) -> (Arc<Mutex<PipelineCoordinator>>, Arc<watch::Sender<CyclePhase>>) {
        let phase = coordinator.phase_handle();
        (Arc::new(Mutex::new(coordinator)), phase)
    }

    #[tokio::test]
    async fn test_runs_bounded_number_of_cycles() {
        let source = Arc::new(Counter(AtomicUsize::new(0)));
        let coordinator =
            PipelineCoordinator::new(&PulseConfig::default(), vec![source.clone() as Arc<dyn PostSource>]).unwrap();
        let (coordinator, phase) = shared(coordinator);

        let summary = CycleLoop::new(
            Arc::clone(&coordinator),
            Arc::clone(&phase),
            Duration::ZERO,
            Duration::ZERO,
            CancellationToken::new(),
        )
        .with_max_cycles(3)
        .run()
        .await;

        assert_eq!(summary, LoopSummary { completed: 3, failed: 0 });
        assert_eq!(source.0.load(Ordering::SeqCst), 3);
        assert_eq!(coordinator.lock().await.state().history.len(), 3);
        assert_eq!(*phase.borrow(), CyclePhase::Stopped);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_sleep() {
        let coordinator = PipelineCoordinator::new(&PulseConfig::default(), Vec::new()).unwrap();
        let (coordinator, phase) = shared(coordinator);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(
            CycleLoop::new(coordinator, phase, Duration::from_secs(3_600), Duration::ZERO, cancel.clone())
                .run(),
        );
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();

        let summary = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary.completed, 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_loop_runs_nothing() {
        let coordinator = PipelineCoordinator::new(&PulseConfig::default(), Vec::new()).unwrap();
        let (coordinator, phase) = shared(coordinator);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = CycleLoop::new(coordinator, phase, Duration::ZERO, Duration::ZERO, cancel)
            .run()
            .await;
        assert_eq!(summary, LoopSummary::default());
    }

    #[tokio::test]
    async fn test_panicking_cycle_backs_off_and_continues() {
        let (source, coordinator) = misbehaving(Misbehaviour::Panic);
        let (coordinator, phase) = shared(coordinator);

        let summary = CycleLoop::new(
            Arc::clone(&coordinator),
            phase,
            Duration::from_secs(3_600),
            Duration::ZERO,
            CancellationToken::new(),
        )
        .with_max_cycles(3)
        .run()
        .await;

        // Zero backoff: every failure is followed straight by the next cycle
        assert_eq!(summary, LoopSummary { completed: 0, failed: 3 });
        assert_eq!(source.0.load(Ordering::SeqCst), 3);
        let coordinator = coordinator.lock().await;
        assert_eq!(coordinator.state().counters.iterations, 3);
        assert_eq!(coordinator.snapshot().iteration, 3);
    }

    #[tokio::test]
    async fn test_publish_error_does_not_fail_cycle() {
        let (source, coordinator) = misbehaving(Misbehaviour::Reject);
        let (coordinator, phase) = shared(coordinator);

        let summary = CycleLoop::new(
            coordinator,
            phase,
            Duration::ZERO,
            Duration::from_secs(3_600),
            CancellationToken::new(),
        )
        .with_max_cycles(3)
        .run()
        .await;

        assert_eq!(summary, LoopSummary { completed: 3, failed: 0 });
        assert_eq!(source.0.load(Ordering::SeqCst), 3);
    }
}
