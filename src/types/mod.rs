//! Shared data structures for the social pulse pipeline
//!
//! - [`Post`]: a collected post, optionally carrying its [`Enrichment`]
//! - [`TrendSignal`]: a ranked keyword trend for one cycle
//! - [`SentimentSummary`] / [`CategorySentiment`]: aggregate sentiment views

mod post;
mod summary;
mod trend;

pub use post::*;
pub use summary::*;
pub use trend::*;
