//! Start/stop control over the cycle loop.
//!
//! The controller owns at most one running [`CycleLoop`] task. `start` and
//! `stop` are idempotent and safe to call from any number of HTTP handlers.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::processing_loop::{CycleLoop, LoopSummary};
use super::state::{CyclePhase, CycleSnapshot, RunStatus};
use super::PipelineCoordinator;

struct Running {
    token: CancellationToken,
    handle: JoinHandle<LoopSummary>,
}

struct ControlState {
    status: RunStatus,
    running: Option<Running>,
    /// Handles of stopped loops that may still be finishing a cycle
    draining: Vec<JoinHandle<LoopSummary>>,
}

pub struct CycleController {
    coordinator: Arc<tokio::sync::Mutex<PipelineCoordinator>>,
    snapshot: Arc<ArcSwap<CycleSnapshot>>,
    phase_tx: Arc<watch::Sender<CyclePhase>>,
    phase_rx: watch::Receiver<CyclePhase>,
    interval: Duration,
    backoff: Duration,
    shutdown: CancellationToken,
    state: Mutex<ControlState>,
}

impl CycleController {
    /// Wrap a coordinator. Loops started later are children of `shutdown`.
    pub fn new(coordinator: PipelineCoordinator, shutdown: CancellationToken) -> Self {
        let snapshot = coordinator.snapshot_handle();
        let phase_tx = coordinator.phase_handle();
        let phase_rx = coordinator.phase_receiver();
        let interval = coordinator.config().update_interval();
        let backoff = coordinator.config().error_backoff();

        Self {
            coordinator: Arc::new(tokio::sync::Mutex::new(coordinator)),
            snapshot,
            phase_tx,
            phase_rx,
            interval,
            backoff,
            shutdown,
            state: Mutex::new(ControlState {
                status: RunStatus::Idle,
                running: None,
                draining: Vec::new(),
            }),
        }
    }

    /// Spawn the cycle loop unless it is already running.
    ///
    /// Returns `true` if a loop was started. Must be called inside a tokio
    /// runtime.
    pub fn start(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            return false;
        }
        if self.shutdown.is_cancelled() {
            warn!("[Control] Shutdown in progress, not starting");
            return false;
        }

        let token = self.shutdown.child_token();
        let cycle_loop = CycleLoop::new(
            Arc::clone(&self.coordinator),
            Arc::clone(&self.phase_tx),
            self.interval,
            self.backoff,
            token.clone(),
        );
        let handle = tokio::spawn(cycle_loop.run());
        state.draining.retain(|h| !h.is_finished());
        state.running = Some(Running { token, handle });
        state.status = RunStatus::Running;
        info!("[Control] ▶ Cycle loop started");
        true
    }

    /// Request the loop to stop after its in-flight cycle.
    ///
    /// Returns `true` if a running loop was signalled.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(running) = state.running.take() else {
            return false;
        };
        running.token.cancel();
        state.draining.push(running.handle);
        state.status = RunStatus::Stopped;
        info!("[Control] ⏹ Cycle loop stop requested");
        true
    }

    pub fn is_running(&self) -> bool {
        self.status() == RunStatus::Running
    }

    pub fn status(&self) -> RunStatus {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).status
    }

    /// Whether the process-wide shutdown has begun.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn phase(&self) -> CyclePhase {
        *self.phase_rx.borrow()
    }

    pub fn snapshot(&self) -> Arc<CycleSnapshot> {
        self.snapshot.load_full()
    }

    pub fn snapshot_handle(&self) -> Arc<ArcSwap<CycleSnapshot>> {
        Arc::clone(&self.snapshot)
    }

    /// Stop the loop and wait for every loop task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let handles: Vec<_> = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.draining.drain(..).collect()
        };
        for handle in handles {
            match handle.await {
                Ok(summary) => info!(
                    completed = summary.completed,
                    failed = summary.failed,
                    "[Control] Cycle loop finished"
                ),
                Err(e) => warn!(error = %e, "[Control] Cycle loop task ended abnormally"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PulseConfig;

    fn controller() -> CycleController {
        let mut config = PulseConfig::default();
        config.cycle.update_interval_secs = 3_600;
        let coordinator = PipelineCoordinator::new(&config, Vec::new()).unwrap();
        CycleController::new(coordinator, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let controller = controller();
        assert_eq!(controller.status(), RunStatus::Idle);
        assert!(controller.start());
        assert!(!controller.start());
        assert!(controller.is_running());
        controller.shutdown().await;
        assert_eq!(controller.status(), RunStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let controller = controller();
        assert!(!controller.stop());
        assert_eq!(controller.status(), RunStatus::Idle);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let controller = controller();
        assert!(controller.start());
        assert!(controller.stop());
        assert!(controller.start());
        controller.shutdown().await;
        assert_eq!(controller.phase(), CyclePhase::Stopped);
    }

    #[tokio::test]
    async fn test_first_cycle_publishes_snapshot() {
        let controller = controller();
        controller.start();
        let handle = controller.snapshot_handle();
        for _ in 0..50 {
            if handle.load().iteration > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(controller.snapshot().iteration, 1);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_uptime_counts_from_start() {
        let controller = controller();
        tokio::time::sleep(Duration::from_millis(2_200)).await;

        controller.start();
        let handle = controller.snapshot_handle();
        for _ in 0..50 {
            if handle.load().iteration > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.iteration, 1);
        assert!(snapshot.counters.uptime_secs < 2, "uptime {}", snapshot.counters.uptime_secs);
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_start_after_shutdown_token_cancelled() {
        let shutdown = CancellationToken::new();
        let coordinator = PipelineCoordinator::new(&PulseConfig::default(), Vec::new()).unwrap();
        let controller = CycleController::new(coordinator, shutdown.clone());
        shutdown.cancel();
        assert!(controller.is_shutting_down());
        assert!(!controller.start());
    }
}
