//! Post source abstraction.
//!
//! Every platform sits behind [`PostSource`]; the collection orchestrator
//! only ever sees the trait. Simulated platforms live in [`simulated`].

pub mod profile;
pub mod simulated;
mod templates;

pub use profile::PlatformProfile;
pub use simulated::{simulated_sources, SimulatedSource};

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Platform, Post};

/// Errors a source may report for one collection call.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("malformed post {id}: {message}")]
    Malformed { id: String, message: String },
}

/// Trait abstracting where posts come from.
///
/// Implementations own their pacing and any internal state. The orchestrator
/// calls [`collect`](PostSource::collect) once per cycle, under a timeout,
/// on its own task.
#[async_trait]
pub trait PostSource: Send + Sync + 'static {
    /// Produce this cycle's batch of raw posts.
    async fn collect(&self) -> Result<Vec<Post>, SourceError>;

    /// Human-readable name for logging and stats (e.g. "twitter-sim").
    fn name(&self) -> &str;

    /// Platform every post from this source is tagged with.
    fn platform(&self) -> Platform;
}
