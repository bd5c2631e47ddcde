//! Aggregate sentiment views over a set of posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SentimentClass;

/// Sentiment distribution over a set of posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentSummary {
    pub total_posts: usize,
    /// Post count per class. Every class is present, zero when unseen.
    pub counts: BTreeMap<SentimentClass, usize>,
    /// Share of `total_posts` per class, in percent
    pub percentages: BTreeMap<SentimentClass, f64>,
    /// Mean hybrid score over posts that carry one
    pub average_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl SentimentSummary {
    /// All-zero summary, as produced for an empty input.
    pub fn empty() -> Self {
        Self {
            total_posts: 0,
            counts: SentimentClass::ALL.iter().map(|c| (*c, 0)).collect(),
            percentages: SentimentClass::ALL.iter().map(|c| (*c, 0.0)).collect(),
            average_score: 0.0,
            timestamp: Utc::now(),
        }
    }

    pub fn count(&self, class: SentimentClass) -> usize {
        self.counts.get(&class).copied().unwrap_or(0)
    }

    pub fn percentage(&self, class: SentimentClass) -> f64 {
        self.percentages.get(&class).copied().unwrap_or(0.0)
    }
}

impl Default for SentimentSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Coarse three-way sentiment split for one business category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySentiment {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub total: usize,
}
