//! Post records and the enrichment attached by the scoring stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Platform / Category / Sentiment enums
// ============================================================================

/// Social platform a post was collected from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
    Instagram,
    TikTok,
}

impl Platform {
    pub const ALL: [Self; 4] = [Self::Reddit, Self::Twitter, Self::Instagram, Self::TikTok];

    /// Lower-case identifier, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reddit => "reddit",
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reddit => write!(f, "Reddit"),
            Self::Twitter => write!(f, "Twitter"),
            Self::Instagram => write!(f, "Instagram"),
            Self::TikTok => write!(f, "TikTok"),
        }
    }
}

/// Business vertical a post is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BusinessCategory {
    Technology,
    Fashion,
    Gaming,
    Business,
    Entertainment,
}

impl BusinessCategory {
    pub const ALL: [Self; 5] = [
        Self::Technology,
        Self::Fashion,
        Self::Gaming,
        Self::Business,
        Self::Entertainment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Technology => "technology",
            Self::Fashion => "fashion",
            Self::Gaming => "gaming",
            Self::Business => "business",
            Self::Entertainment => "entertainment",
        }
    }
}

impl std::fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five-way sentiment classification derived from the hybrid score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SentimentClass {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl SentimentClass {
    pub const ALL: [Self; 5] = [
        Self::VeryPositive,
        Self::Positive,
        Self::Neutral,
        Self::Negative,
        Self::VeryNegative,
    ];

    pub const fn is_positive(self) -> bool {
        matches!(self, Self::VeryPositive | Self::Positive)
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Self::VeryNegative | Self::Negative)
    }
}

impl std::fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VeryPositive => write!(f, "very_positive"),
            Self::Positive => write!(f, "positive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Negative => write!(f, "negative"),
            Self::VeryNegative => write!(f, "very_negative"),
        }
    }
}

// ============================================================================
// Enrichment
// ============================================================================

/// Whether the enrichment came from a successful scoring pass or the
/// neutral fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored,
    Degraded,
}

/// Scoring output for a single post.
///
/// Always assigned as a whole: a post carries either a complete enrichment
/// or none at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrichment {
    pub sentiment: SentimentClass,
    /// Hybrid polarity in `[-1, 1]`
    pub sentiment_score: f64,
    /// Interactions per follower, capped at 1.0. Absent on the degraded path.
    pub engagement_rate: Option<f64>,
    /// 0..=10 business relevance score. Absent on the degraded path.
    pub business_potential: Option<u8>,
    pub outcome: ScoreOutcome,
}

impl Enrichment {
    /// Neutral fallback used when a post cannot be scored.
    pub const fn degraded() -> Self {
        Self {
            sentiment: SentimentClass::Neutral,
            sentiment_score: 0.0,
            engagement_rate: None,
            business_potential: None,
            outcome: ScoreOutcome::Degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.outcome == ScoreOutcome::Degraded
    }
}

// ============================================================================
// Post
// ============================================================================

/// A single social media post.
///
/// Raw fields are fixed at collection time; the scoring stage only ever sets
/// `enrichment`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub platform: Platform,
    pub content: String,
    pub author: String,
    pub author_followers: u64,
    pub created_at: DateTime<Utc>,
    pub url: String,
    /// Interaction counters (likes, comments, shares, ...). Missing keys read as 0.
    #[serde(default)]
    pub metrics: BTreeMap<String, u64>,
    pub category: BusinessCategory,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(flatten)]
    pub enrichment: Option<Enrichment>,
}

impl Post {
    /// Minimal post stamped with the current time. Mostly useful for
    /// sources that fill the remaining fields with builder calls.
    pub fn new(
        id: impl Into<String>,
        platform: Platform,
        category: BusinessCategory,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            platform,
            content: content.into(),
            author: String::new(),
            author_followers: 0,
            created_at: Utc::now(),
            url: String::new(),
            metrics: BTreeMap::new(),
            category,
            metadata: serde_json::Map::new(),
            enrichment: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>, followers: u64) -> Self {
        self.author = author.into();
        self.author_followers = followers;
        self
    }

    pub fn with_metric(mut self, key: &str, value: u64) -> Self {
        self.metrics.insert(key.to_string(), value);
        self
    }

    pub const fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Read an interaction counter, treating a missing key as zero.
    pub fn metric(&self, key: &str) -> u64 {
        self.metrics.get(key).copied().unwrap_or(0)
    }

    /// Follower count safe for use as a denominator.
    pub fn follower_base(&self) -> u64 {
        self.author_followers.max(1)
    }

    pub fn sentiment(&self) -> Option<SentimentClass> {
        self.enrichment.as_ref().map(|e| e.sentiment)
    }

    pub fn sentiment_score(&self) -> Option<f64> {
        self.enrichment.as_ref().map(|e| e.sentiment_score)
    }

    pub const fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }
}
