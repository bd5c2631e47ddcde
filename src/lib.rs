//! Social Pulse: Social Business Intelligence Pipeline
//!
//! Periodic collection of social media posts, hybrid sentiment scoring and
//! keyword trend detection, served to a live dashboard.
//!
//! ## Architecture
//!
//! - **Sources**: `PostSource` implementations, one per platform
//! - **Collection**: concurrent fan-out with per-source and overall timeouts
//! - **Analysis**: chunked parallel scoring (hybrid sentiment, engagement,
//!   business potential) and sentiment summaries
//! - **Trends**: keyword volume, growth and market opportunity ranking
//! - **Pipeline**: cycle coordinator, loop, start/stop control and snapshot
//!   publication
//! - **API**: axum HTTP endpoints and WebSocket event stream

pub mod analysis;
pub mod api;
pub mod collection;
pub mod config;
pub mod pipeline;
pub mod sources;
pub mod trends;
pub mod types;

// Re-export configuration
pub use config::PulseConfig;

// Re-export commonly used types
pub use types::{
    BusinessCategory, CategorySentiment, Enrichment, Platform, Post, ScoreOutcome,
    SentimentClass, SentimentSummary, TrendSignal,
};

// Re-export pipeline stages
pub use analysis::{HybridScorer, ScoringEngine};
pub use collection::{CollectionBatch, CollectionOrchestrator};
pub use pipeline::{CycleController, CycleReport, CycleSnapshot, PipelineCoordinator};
pub use sources::{PostSource, SimulatedSource, SourceError};
pub use trends::{TrendAggregator, TrendDetection, VolumeMap};
