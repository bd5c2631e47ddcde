//! Trend Aggregator - keyword volume tracking and trend ranking
//!
//! Each cycle the scored batch is scanned for the configured vocabulary.
//! A keyword trends when it is mentioned often enough and is either growing
//! against the previous cycle or simply loud. Volumes are carried from cycle
//! to cycle by the caller through a [`VolumeMap`].

use chrono::Utc;
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::config::defaults::{
    MAX_MARKET_OPPORTUNITY, OPPORTUNITY_CONFIDENCE_POINTS, OPPORTUNITY_GROWTH_POINTS,
    OPPORTUNITY_POSITIVE_POINTS,
};
use crate::config::TrendConfig;
use crate::types::{BusinessCategory, Platform, Post, SentimentClass, TrendSignal};

/// Keyword -> mention count from the most recent cycle that mentioned it.
pub type VolumeMap = HashMap<String, u64>;

#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("non-finite score while ranking keyword '{keyword}'")]
    NonFinite { keyword: String },
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct TrendDetection {
    /// Ranked signals, best first
    pub signals: Vec<TrendSignal>,
    /// Volume map to feed into the next cycle
    pub volumes: VolumeMap,
}

/// Relative volume change between two cycles.
///
/// A keyword appearing from nothing counts as 100% growth.
pub fn growth_rate(previous: u64, current: u64) -> f64 {
    match (previous, current) {
        (0, 0) => 0.0,
        (0, _) => 1.0,
        (p, c) => (c as f64 - p as f64) / p as f64,
    }
}

struct Keyword {
    term: String,
    matcher: Regex,
}

/// Per-keyword accumulation for one batch.
struct Tally<'a> {
    keyword: &'a Keyword,
    count: u64,
    sentiments: BTreeMap<SentimentClass, u64>,
    categories: Vec<(BusinessCategory, u64)>,
    platforms: Vec<Platform>,
    phrases: Vec<String>,
}

impl<'a> Tally<'a> {
    fn new(keyword: &'a Keyword) -> Self {
        Self {
            keyword,
            count: 0,
            sentiments: SentimentClass::ALL.iter().map(|c| (*c, 0)).collect(),
            categories: Vec::new(),
            platforms: Vec::new(),
            phrases: Vec::new(),
        }
    }

    /// Most frequent category; ties go to the one seen first.
    fn dominant_category(&self) -> Option<BusinessCategory> {
        let mut best: Option<(BusinessCategory, u64)> = None;
        for &(category, n) in &self.categories {
            if best.map_or(true, |(_, top)| n > top) {
                best = Some((category, n));
            }
        }
        best.map(|(category, _)| category)
    }
}

pub struct TrendAggregator {
    keywords: Vec<Keyword>,
    min_volume: u64,
    growth_threshold: f64,
    volume_override: u64,
    max_signals: usize,
    max_phrases: usize,
    context_chars: usize,
    confidence_volume: u64,
}

impl TrendAggregator {
    pub fn new(config: &TrendConfig) -> Result<Self, TrendError> {
        let mut keywords = Vec::with_capacity(config.keywords.len());
        for term in &config.keywords {
            let term = term.trim();
            if term.is_empty() {
                warn!("[Trends] Skipping blank keyword");
                continue;
            }
            let matcher = RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()?;
            keywords.push(Keyword { term: term.to_string(), matcher });
        }

        Ok(Self {
            keywords,
            min_volume: config.min_volume,
            growth_threshold: config.growth_threshold,
            volume_override: config.volume_override,
            max_signals: config.max_signals,
            max_phrases: config.max_phrases,
            context_chars: config.context_chars,
            confidence_volume: config.confidence_volume.max(1),
        })
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| k.term.as_str())
    }

    /// Detect trends, degrading to an empty signal list on failure.
    ///
    /// The returned volumes are unchanged from `previous` when aggregation
    /// fails.
    pub fn detect(&self, posts: &[Post], previous: &VolumeMap) -> TrendDetection {
        match self.aggregate(posts, previous) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "[Trends] Aggregation failed, no signals this cycle");
                TrendDetection { signals: Vec::new(), volumes: previous.clone() }
            }
        }
    }

    /// Tally keyword mentions in `posts`, gate them and rank the survivors.
    pub fn aggregate(&self, posts: &[Post], previous: &VolumeMap) -> Result<TrendDetection, TrendError> {
        let tallies = self.tally(posts);
        let now = Utc::now();

        let mut volumes = previous.clone();
        let mut signals = Vec::new();

        for tally in &tallies {
            let term = &tally.keyword.term;
            let prev = previous.get(term).copied().unwrap_or(0);
            let growth = growth_rate(prev, tally.count);
            volumes.insert(term.clone(), tally.count);

            let qualifies = tally.count >= self.min_volume
                && (growth > self.growth_threshold || tally.count > self.volume_override);
            if !qualifies {
                debug!(keyword = %term, volume = tally.count, growth, "[Trends] Below gate");
                continue;
            }

            let confidence = (tally.count as f64 / self.confidence_volume as f64).min(1.0);
            let mut signal = TrendSignal {
                keyword: term.clone(),
                name: term.to_uppercase(),
                volume: tally.count,
                growth,
                sentiment_distribution: tally.sentiments.clone(),
                key_phrases: tally.phrases.clone(),
                platforms: tally.platforms.clone(),
                category: tally.dominant_category().unwrap_or(BusinessCategory::Technology),
                confidence,
                market_opportunity: 0,
                detected_at: now,
            };

            let raw = OPPORTUNITY_GROWTH_POINTS * growth
                + OPPORTUNITY_POSITIVE_POINTS * signal.positive_ratio()
                + OPPORTUNITY_CONFIDENCE_POINTS * confidence;
            if !raw.is_finite() {
                return Err(TrendError::NonFinite { keyword: term.clone() });
            }
            signal.market_opportunity =
                raw.floor().clamp(0.0, f64::from(MAX_MARKET_OPPORTUNITY)) as u8;
            signals.push(signal);
        }

        // Stable: equal scores keep encounter order.
        signals.sort_by(|a, b| b.market_opportunity.cmp(&a.market_opportunity));
        signals.truncate(self.max_signals);

        if !signals.is_empty() {
            info!(
                signals = signals.len(),
                top = %signals[0].name,
                top_opportunity = signals[0].market_opportunity,
                "[Trends] 📈 Trends detected"
            );
        }

        Ok(TrendDetection { signals, volumes })
    }

    fn tally(&self, posts: &[Post]) -> Vec<Tally<'_>> {
        let mut tallies: Vec<Tally<'_>> = Vec::new();
        let mut slot: HashMap<usize, usize> = HashMap::new();

        for post in posts {
            for (k, keyword) in self.keywords.iter().enumerate() {
                let Some(hit) = keyword.matcher.find(&post.content) else {
                    continue;
                };
                let index = *slot.entry(k).or_insert_with(|| {
                    tallies.push(Tally::new(keyword));
                    tallies.len() - 1
                });
                let tally = &mut tallies[index];

                tally.count += 1;
                if let Some(class) = post.sentiment() {
                    *tally.sentiments.entry(class).or_default() += 1;
                }
                match tally.categories.iter_mut().find(|(c, _)| *c == post.category) {
                    Some((_, n)) => *n += 1,
                    None => tally.categories.push((post.category, 1)),
                }
                if !tally.platforms.contains(&post.platform) {
                    tally.platforms.push(post.platform);
                }
                if tally.phrases.len() < self.max_phrases {
                    let phrase = context_snippet(&post.content, hit.start(), hit.end(), self.context_chars);
                    if !phrase.is_empty() {
                        tally.phrases.push(phrase);
                    }
                }
            }
        }

        tallies
    }
}

/// Up to `chars` characters either side of `text[start..end]`, trimmed.
///
/// The window never crosses a line break and keeps the post's own casing.
fn context_snippet(text: &str, start: usize, end: usize, chars: usize) -> String {
    let is_break = |c: char| c == '\n' || c == '\r';
    let line_start = text[..start].rfind(is_break).map_or(0, |i| i + 1);
    let line_end = text[end..].find(is_break).map_or(text.len(), |i| end + i);

    let from = if chars == 0 {
        start
    } else {
        text[line_start..start]
            .char_indices()
            .rev()
            .nth(chars - 1)
            .map_or(line_start, |(i, _)| line_start + i)
    };
    let to = text[end..line_end]
        .char_indices()
        .nth(chars)
        .map_or(line_end, |(i, _)| end + i);
    text[from..to].trim().to_string()
}
