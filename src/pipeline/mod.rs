//! Cycle Pipeline Module
//!
//! ## Cycle Architecture
//!
//! ```text
//! PHASE 1: Collecting   (every source concurrently, per-source + overall timeout)
//! PHASE 2: Scoring      (new posts only, chunked across the rayon pool)
//! PHASE 3: Aggregating  (keyword trends against the previous cycle's volumes)
//! PHASE 4: Publishing   (history, active window, summary, snapshot, events)
//! then Sleeping for the update interval (error backoff after a failure)
//! ```
//!
//! Every 10th iteration the history is pruned to the retention period.

mod control;
mod coordinator;
pub mod processing_loop;
pub mod publisher;
mod state;

pub use control::CycleController;
pub use coordinator::{CycleError, CycleReport, PipelineCoordinator};
pub use processing_loop::{CycleLoop, LoopSummary};
pub use publisher::{BroadcastPublisher, CycleUpdate, DashboardEvent, PublishError, SnapshotPublisher};
pub use state::*;
