//! Scoring Engine - chunked, parallel enrichment of collected posts
//!
//! A batch is split into contiguous chunks that run on a bounded rayon pool.
//! Every post gets exactly one enrichment: a full score, or the neutral
//! degraded fallback when scoring it fails. Order is preserved.

use rayon::prelude::*;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::sentiment::{HybridScorer, SentimentError};
use crate::config::defaults::{
    ENGAGEMENT_METRICS, ENGAGEMENT_POINTS, LIKES_POINTS, LIKES_SATURATION,
    MAX_BUSINESS_POTENTIAL, NEGATIVE_ABOVE, NEUTRAL_ABOVE, NEUTRAL_BONUS_POINTS, POSITIVE_ABOVE,
    POSITIVE_BONUS_POINTS, REACH_POINTS, REACH_SATURATION_FOLLOWERS, VERY_POSITIVE_ABOVE,
};
use crate::config::ScoringConfig;
use crate::types::{Enrichment, Post, ScoreOutcome, SentimentClass};

// ============================================================================
// Pure Scoring Functions
// ============================================================================

/// Map a hybrid score onto the five sentiment classes.
///
/// Every threshold is exclusive: a score sitting exactly on a boundary falls
/// into the class below it.
pub fn classify(score: f64) -> SentimentClass {
    if score > VERY_POSITIVE_ABOVE {
        SentimentClass::VeryPositive
    } else if score > POSITIVE_ABOVE {
        SentimentClass::Positive
    } else if score > NEUTRAL_ABOVE {
        SentimentClass::Neutral
    } else if score > NEGATIVE_ABOVE {
        SentimentClass::Negative
    } else {
        SentimentClass::VeryNegative
    }
}

/// Interactions per follower, capped at 1.0.
pub fn engagement_rate(post: &Post) -> f64 {
    let interactions: u64 = ENGAGEMENT_METRICS
        .iter()
        .map(|key| post.metric(key))
        .fold(0, u64::saturating_add);
    (interactions as f64 / post.follower_base() as f64).min(1.0)
}

/// 0..=10 business relevance of a post.
pub fn business_potential(post: &Post, sentiment: SentimentClass, engagement: f64) -> u8 {
    let bonus = if sentiment.is_positive() {
        POSITIVE_BONUS_POINTS
    } else if sentiment == SentimentClass::Neutral {
        NEUTRAL_BONUS_POINTS
    } else {
        0.0
    };
    let reach = (post.author_followers as f64 / REACH_SATURATION_FOLLOWERS).min(1.0);
    let likes = (post.metric("likes") as f64 / LIKES_SATURATION).min(1.0);

    let points = ENGAGEMENT_POINTS * engagement.clamp(0.0, 1.0)
        + bonus
        + REACH_POINTS * reach
        + LIKES_POINTS * likes;
    let max = f64::from(MAX_BUSINESS_POTENTIAL);
    (points / 10.0).min(max).max(0.0).floor() as u8
}

// ============================================================================
// Errors & Statistics
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("scoring chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("scoring worker count must be greater than zero")]
    InvalidWorkers,

    #[error("failed to build scoring thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Lifetime scoring statistics. Only ever grows until restart.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScorerStats {
    pub total_analyzed: u64,
    /// Batches scored
    pub analysis_count: u64,
    /// Running mean batch duration (milliseconds)
    pub average_time_ms: f64,
    pub degraded_total: u64,
    pub lost_total: u64,
}

/// Result of scoring one batch.
#[derive(Debug, Default)]
pub struct ScoringReport {
    pub posts: Vec<Post>,
    /// Posts that received the neutral fallback
    pub degraded: usize,
    /// Posts dropped because their whole chunk failed
    pub lost: usize,
    pub elapsed: Duration,
}

// ============================================================================
// Scoring Engine
// ============================================================================

pub struct ScoringEngine {
    scorer: HybridScorer,
    pool: rayon::ThreadPool,
    chunk_size: usize,
    stats: Mutex<ScorerStats>,
}

impl ScoringEngine {
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        Self::with_scorer(config, HybridScorer::standard())
    }

    /// Engine with a custom hybrid scorer.
    pub fn with_scorer(config: &ScoringConfig, scorer: HybridScorer) -> Result<Self, ScoringError> {
        if config.chunk_size == 0 {
            return Err(ScoringError::InvalidChunkSize);
        }
        if config.max_workers == 0 {
            return Err(ScoringError::InvalidWorkers);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers)
            .thread_name(|i| format!("pulse-scorer-{i}"))
            .build()?;

        Ok(Self {
            scorer,
            pool,
            chunk_size: config.chunk_size,
            stats: Mutex::new(ScorerStats::default()),
        })
    }

    /// Enrich every post, returning them in input order.
    pub fn score(&self, posts: Vec<Post>) -> Vec<Post> {
        self.score_batch(posts).posts
    }

    /// Enrich a batch and report how many posts degraded or were lost.
    ///
    /// Blocks on the worker pool; call it from `spawn_blocking` inside async
    /// code.
    pub fn score_batch(&self, posts: Vec<Post>) -> ScoringReport {
        let started = Instant::now();
        let total = posts.len();
        if total == 0 {
            return ScoringReport::default();
        }

        let mut chunks: Vec<Vec<Post>> = Vec::with_capacity(total.div_ceil(self.chunk_size));
        let mut rest = posts.into_iter().peekable();
        while rest.peek().is_some() {
            chunks.push(rest.by_ref().take(self.chunk_size).collect());
        }
        let chunk_count = chunks.len();

        let results: Vec<Result<Vec<Post>, usize>> = self.pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| {
                    let len = chunk.len();
                    catch_unwind(AssertUnwindSafe(|| self.score_chunk(chunk))).map_err(|_| len)
                })
                .collect()
        });

        let mut report = ScoringReport { posts: Vec::with_capacity(total), ..Default::default() };
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(chunk) => report.posts.extend(chunk),
                Err(len) => {
                    error!(chunk = index, posts = len, "[Scorer] Chunk panicked, posts lost");
                    report.lost += len;
                }
            }
        }
        report.degraded = report
            .posts
            .iter()
            .filter(|p| p.enrichment.as_ref().is_some_and(Enrichment::is_degraded))
            .count();
        report.elapsed = started.elapsed();

        self.record(&report);
        info!(
            posts = report.posts.len(),
            chunks = chunk_count,
            degraded = report.degraded,
            lost = report.lost,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "[Scorer] Batch scored"
        );

        report
    }

    pub fn stats(&self) -> ScorerStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn score_chunk(&self, mut chunk: Vec<Post>) -> Vec<Post> {
        for post in &mut chunk {
            let enrichment =
                match catch_unwind(AssertUnwindSafe(|| self.enrich(post))) {
                    Ok(Ok(enrichment)) => enrichment,
                    Ok(Err(e)) => {
                        debug!(post = %post.id, error = %e, "[Scorer] Degraded to neutral");
                        Enrichment::degraded()
                    }
                    Err(_) => {
                        debug!(post = %post.id, "[Scorer] Engine panicked, degraded to neutral");
                        Enrichment::degraded()
                    }
                };
            post.enrichment = Some(enrichment);
        }
        chunk
    }

    fn enrich(&self, post: &Post) -> Result<Enrichment, SentimentError> {
        let sentiment_score = self.scorer.score(&post.content)?;
        let sentiment = classify(sentiment_score);
        let engagement = engagement_rate(post);
        Ok(Enrichment {
            sentiment,
            sentiment_score,
            engagement_rate: Some(engagement),
            business_potential: Some(business_potential(post, sentiment, engagement)),
            outcome: ScoreOutcome::Scored,
        })
    }

    fn record(&self, report: &ScoringReport) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.total_analyzed += report.posts.len() as u64;
        stats.analysis_count += 1;
        let n = stats.analysis_count as f64;
        let elapsed_ms = report.elapsed.as_secs_f64() * 1_000.0;
        stats.average_time_ms += (elapsed_ms - stats.average_time_ms) / n;
        stats.degraded_total += report.degraded as u64;
        stats.lost_total += report.lost as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sentiment::SentimentEngine;
    use crate::types::{BusinessCategory, Platform};

    fn post(id: usize, content: &str) -> Post {
        Post::new(format!("p{id}"), Platform::Twitter, BusinessCategory::Technology, content)
    }

    fn config(chunk_size: usize, max_workers: usize) -> ScoringConfig {
        ScoringConfig { chunk_size, max_workers }
    }

    /// Fails on any text containing "poison", panics on "boom".
    struct Picky;

    impl SentimentEngine for Picky {
        fn name(&self) -> &'static str {
            "picky"
        }

        fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
            if text.contains("boom") {
                panic!("engine blew up");
            }
            if text.contains("poison") {
                return Err(SentimentError::Engine { engine: "picky", message: "bad input".into() });
            }
            Ok(0.8)
        }
    }

    fn picky_engine(chunk_size: usize) -> ScoringEngine {
        let scorer = HybridScorer::new(Box::new(Picky), Box::new(Picky));
        ScoringEngine::with_scorer(&config(chunk_size, 2), scorer).unwrap()
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify(0.5), SentimentClass::Positive);
        assert_eq!(classify(0.1), SentimentClass::Neutral);
        assert_eq!(classify(-0.1), SentimentClass::Negative);
        assert_eq!(classify(-0.5), SentimentClass::VeryNegative);
        assert_eq!(classify(-0.49), SentimentClass::Negative);
        assert_eq!(classify(0.51), SentimentClass::VeryPositive);
        assert_eq!(classify(-0.51), SentimentClass::VeryNegative);
        assert_eq!(classify(0.0), SentimentClass::Neutral);
    }

    #[test]
    fn test_engagement_capped_and_zero_followers_safe() {
        let p = post(0, "x").with_metric("likes", u64::MAX).with_metric("shares", u64::MAX);
        assert_eq!(engagement_rate(&p), 1.0);

        let p = post(1, "x").with_author("a", 1_000).with_metric("likes", 30).with_metric("retweets", 20);
        assert!((engagement_rate(&p) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_business_potential_formula() {
        // 40*1 + 30 + 20*1 + 10*1 = 100 -> 10
        let p = post(0, "x").with_author("a", 200_000).with_metric("likes", 20_000);
        assert_eq!(business_potential(&p, SentimentClass::VeryPositive, 1.0), 10);

        // 40*0.05 + 15 + 20*0.01 + 10*0.003 = 17.23 -> 1
        let p = post(1, "x").with_author("a", 1_000).with_metric("likes", 30);
        assert_eq!(business_potential(&p, SentimentClass::Neutral, 0.05), 1);

        // Negative posts get no bonus: 0 -> 0
        let p = post(2, "x");
        assert_eq!(business_potential(&p, SentimentClass::Negative, 0.0), 0);
    }

    #[test]
    fn test_business_potential_bounded_for_extreme_inputs() {
        let p = post(0, "x").with_author("a", u64::MAX).with_metric("likes", u64::MAX);
        for class in SentimentClass::ALL {
            assert!(business_potential(&p, class, f64::MAX) <= MAX_BUSINESS_POTENTIAL);
        }
    }

    #[test]
    fn test_every_post_enriched_in_order() {
        let engine = ScoringEngine::new(&config(3, 2)).unwrap();
        let posts: Vec<_> = (0..10).map(|i| post(i, "great launch, love it")).collect();
        let scored = engine.score(posts);
        assert_eq!(scored.len(), 10);
        for (i, p) in scored.iter().enumerate() {
            assert_eq!(p.id, format!("p{i}"));
            let e = p.enrichment.as_ref().unwrap();
            assert_eq!(e.outcome, ScoreOutcome::Scored);
            assert!((-1.0..=1.0).contains(&e.sentiment_score));
            assert!(e.business_potential.is_some());
        }
    }

    #[test]
    fn test_failing_posts_degrade_without_drops() {
        let engine = picky_engine(2);
        let posts = vec![
            post(0, "fine"),
            post(1, "poison"),
            post(2, "boom"),
            post(3, "fine"),
            post(4, ""),
        ];
        let report = engine.score_batch(posts);
        assert_eq!(report.posts.len(), 5);
        assert_eq!(report.degraded, 2);
        assert_eq!(report.lost, 0);

        let degraded = report.posts[1].enrichment.as_ref().unwrap();
        assert_eq!(degraded.sentiment, SentimentClass::Neutral);
        assert_eq!(degraded.sentiment_score, 0.0);
        assert!(degraded.engagement_rate.is_none());
        assert!(degraded.business_potential.is_none());

        // Blank content never reaches the engines
        let blank = report.posts[4].enrichment.as_ref().unwrap();
        assert_eq!(blank.outcome, ScoreOutcome::Scored);
        assert_eq!(blank.sentiment_score, 0.0);
    }

    #[test]
    fn test_stats_accumulate() {
        let engine = picky_engine(4);
        engine.score((0..6).map(|i| post(i, "fine")).collect());
        engine.score(vec![post(9, "poison")]);
        let stats = engine.stats();
        assert_eq!(stats.total_analyzed, 7);
        assert_eq!(stats.analysis_count, 2);
        assert_eq!(stats.degraded_total, 1);
    }

    #[test]
    fn test_empty_batch() {
        let engine = ScoringEngine::new(&config(50, 4)).unwrap();
        let report = engine.score_batch(Vec::new());
        assert!(report.posts.is_empty());
        assert_eq!(engine.stats().analysis_count, 0);
    }

    #[test]
    fn test_zero_chunk_size_or_workers_rejected() {
        assert!(matches!(
            ScoringEngine::new(&config(0, 4)),
            Err(ScoringError::InvalidChunkSize)
        ));
        assert!(matches!(
            ScoringEngine::new(&config(50, 0)),
            Err(ScoringError::InvalidWorkers)
        ));
    }
}
