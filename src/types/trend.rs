//! Trend signals produced by the aggregation stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BusinessCategory, Platform, SentimentClass};

/// A keyword that passed the detection gate in one cycle.
///
/// Built fresh every cycle; only the keyword's volume is carried forward
/// into the next one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSignal {
    /// Vocabulary term as configured (e.g. "AI", "thrift")
    pub keyword: String,
    /// Display name, the upper-cased keyword
    pub name: String,
    /// Number of posts mentioning the keyword this cycle
    pub volume: u64,
    /// Relative change against the previous cycle's volume
    pub growth: f64,
    pub sentiment_distribution: BTreeMap<SentimentClass, u64>,
    /// Short context snippets around the keyword
    pub key_phrases: Vec<String>,
    /// Distinct platforms, in first-seen order
    pub platforms: Vec<Platform>,
    /// Most frequent category among matching posts
    pub category: BusinessCategory,
    pub confidence: f64,
    /// 0..=100 ranking score
    pub market_opportunity: u8,
    pub detected_at: DateTime<Utc>,
}

impl TrendSignal {
    /// Share of sentiment observations that were positive or very positive.
    pub fn positive_ratio(&self) -> f64 {
        let observed: u64 = self.sentiment_distribution.values().sum();
        let positive: u64 = self
            .sentiment_distribution
            .iter()
            .filter(|(class, _)| class.is_positive())
            .map(|(_, n)| n)
            .sum();
        positive as f64 / observed.max(1) as f64
    }
}
