//! Sentiment summaries over a set of scored posts.

use chrono::Utc;
use std::collections::BTreeMap;

use crate::types::{BusinessCategory, CategorySentiment, Post, SentimentClass, SentimentSummary};

/// Class counts, percentages and mean score over `posts`.
///
/// Unscored posts count as neutral and are left out of the average.
pub fn summarize<'a>(posts: impl IntoIterator<Item = &'a Post>) -> SentimentSummary {
    let mut summary = SentimentSummary::empty();
    let mut score_sum = 0.0;
    let mut scored = 0usize;

    for post in posts {
        summary.total_posts += 1;
        let class = post.sentiment().unwrap_or(SentimentClass::Neutral);
        *summary.counts.entry(class).or_default() += 1;
        if let Some(score) = post.sentiment_score() {
            score_sum += score;
            scored += 1;
        }
    }

    if summary.total_posts == 0 {
        return summary;
    }

    let total = summary.total_posts as f64;
    for (class, count) in &summary.counts {
        summary.percentages.insert(*class, *count as f64 / total * 100.0);
    }
    if scored > 0 {
        summary.average_score = score_sum / scored as f64;
    }
    summary.timestamp = Utc::now();
    summary
}

/// Three-way sentiment split per business category.
///
/// Only categories that appear in `posts` are present.
pub fn category_breakdown<'a>(
    posts: impl IntoIterator<Item = &'a Post>,
) -> BTreeMap<BusinessCategory, CategorySentiment> {
    let mut breakdown: BTreeMap<BusinessCategory, CategorySentiment> = BTreeMap::new();
    for post in posts {
        let entry = breakdown.entry(post.category).or_default();
        entry.total += 1;
        match post.sentiment() {
            Some(class) if class.is_positive() => entry.positive += 1,
            Some(class) if class.is_negative() => entry.negative += 1,
            _ => entry.neutral += 1,
        }
    }
    breakdown
}
