//! Scoring stage: hybrid sentiment, engagement and business potential,
//! plus the summaries computed over scored posts.

pub mod scoring;
pub mod sentiment;
mod summary;

pub use scoring::{
    business_potential, classify, engagement_rate, ScorerStats, ScoringEngine, ScoringError,
    ScoringReport,
};
pub use sentiment::{HybridScorer, SentimentEngine, SentimentError};
pub use summary::{category_breakdown, summarize};
