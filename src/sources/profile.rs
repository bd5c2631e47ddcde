//! Per-platform shape of simulated posts, plus the market events that skew
//! a whole collection.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::types::{BusinessCategory, Platform};

// ============================================================================
// Market Events
// ============================================================================

/// A market event drawn once per collection call.
///
/// Shifts the share of positive posts and may blow up the headline metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketEvent {
    pub name: &'static str,
    /// Added to the platform's base positive ratio
    pub sentiment_shift: f64,
    /// Multiplier on the headline metric, 1.0 when nothing went viral
    pub viral_multiplier: f64,
}

impl MarketEvent {
    /// Draw an event: 10% very positive, 15% positive, 10% very negative,
    /// 15% negative, 50% normal.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f64 = rng.gen();
        let (names, shift, viral): (&[&'static str], (f64, f64), Option<(f64, f64)>) = if roll < 0.10 {
            (&["Viral Success", "Product Launch", "Award"], (0.5, 0.8), Some((5.0, 10.0)))
        } else if roll < 0.25 {
            (&["Partnership", "Review", "Update"], (0.2, 0.4), Some((2.0, 4.0)))
        } else if roll < 0.35 {
            (&["Data Breach", "Scandal", "Layoffs"], (-0.8, -0.5), Some((6.0, 12.0)))
        } else if roll < 0.50 {
            (&["Outage", "Price Hike", "Complaints"], (-0.5, -0.3), Some((3.0, 6.0)))
        } else {
            (&["normal"], (-0.15, 0.15), None)
        };

        Self {
            name: names[rng.gen_range(0..names.len())],
            sentiment_shift: rng.gen_range(shift.0..=shift.1),
            viral_multiplier: viral.map_or(1.0, |(lo, hi)| rng.gen_range(lo..=hi)),
        }
    }

    pub fn is_normal(&self) -> bool {
        self.name == "normal"
    }
}

// ============================================================================
// Platform Profiles
// ============================================================================

/// Metrics and platform extras drawn for one simulated post.
#[derive(Debug, Clone, Default)]
pub struct DrawnMetrics {
    pub metrics: BTreeMap<String, u64>,
    pub extras: Map<String, Value>,
}

/// How one platform's simulated posts look.
#[derive(Debug, Clone, Copy)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Posts generated per business category, inclusive range
    pub posts_per_category: (usize, usize),
    /// Share of positive posts before the market event shift
    pub base_positive_ratio: f64,
    /// Author follower count, inclusive range
    pub followers: (u64, u64),
}

impl PlatformProfile {
    pub const fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Reddit => Self {
                platform,
                posts_per_category: (8, 12),
                base_positive_ratio: 0.6,
                followers: (5_000, 50_000),
            },
            Platform::Twitter => Self {
                platform,
                posts_per_category: (8, 12),
                base_positive_ratio: 0.3,
                followers: (1_000, 100_000),
            },
            Platform::Instagram => Self {
                platform,
                posts_per_category: (11, 17),
                base_positive_ratio: 0.5,
                followers: (10_000, 1_000_000),
            },
            Platform::TikTok => Self {
                platform,
                posts_per_category: (10, 15),
                base_positive_ratio: 0.5,
                followers: (10_000, 1_000_000),
            },
        }
    }

    /// Positive share after an event shift, kept inside `[0, 1]`.
    pub fn positive_ratio(&self, event: &MarketEvent) -> f64 {
        (self.base_positive_ratio + event.sentiment_shift).clamp(0.0, 1.0)
    }

    pub fn draw_post_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.posts_per_category.0..=self.posts_per_category.1)
    }

    pub fn draw_followers<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.followers.0..=self.followers.1)
    }

    pub fn draw_author<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.platform {
            Platform::Reddit => format!("u/redditor_{}", rng.gen_range(1000..=9999)),
            Platform::Twitter => format!("@user{}", rng.gen_range(1000..=9999)),
            Platform::Instagram => {
                let niche = ["fashion", "tech", "lifestyle", "travel"][rng.gen_range(0..4)];
                format!("@{niche}{}", rng.gen_range(100..=9999))
            }
            Platform::TikTok => format!("@tiktok{}", rng.gen_range(100..=999)),
        }
    }

    pub fn url(&self, category: BusinessCategory, author: &str, post_no: u64) -> String {
        match self.platform {
            Platform::Reddit => format!("https://reddit.com/r/{category}/comments/{post_no}"),
            Platform::Twitter => format!("https://twitter.com/i/status/{post_no}"),
            Platform::Instagram => format!("https://instagram.com/p/{post_no}"),
            Platform::TikTok => format!("https://tiktok.com/{author}/video/{post_no}"),
        }
    }

    /// Draw the platform-specific interaction counters.
    ///
    /// The headline metric (upvotes, likes or views) is scaled by the event's
    /// viral multiplier; the rest derive from it the way each platform's
    /// audience tends to behave.
    pub fn draw_metrics<R: Rng + ?Sized>(&self, rng: &mut R, event: &MarketEvent) -> DrawnMetrics {
        let viral = |base: u64| scale(base, event.viral_multiplier);
        let mut drawn = DrawnMetrics::default();
        let m = &mut drawn.metrics;

        match self.platform {
            Platform::Reddit => {
                m.insert("upvotes".into(), viral(rng.gen_range(100..=5_000)));
                m.insert("comments".into(), rng.gen_range(10..=300));
                m.insert("awards".into(), rng.gen_range(0..=10));
            }
            Platform::Twitter => {
                let likes = viral(rng.gen_range(50..=5_000));
                m.insert("likes".into(), likes);
                m.insert("retweets".into(), likes / rng.gen_range(5..=10));
                m.insert("replies".into(), likes / rng.gen_range(10..=20));
                m.insert("quotes".into(), likes / rng.gen_range(20..=50));
            }
            Platform::Instagram => {
                let post_type = ["photo", "carousel", "reels"][rng.gen_range(0..3)];
                let likes = viral(rng.gen_range(1_000..=50_000));
                m.insert("likes".into(), likes);
                m.insert("comments".into(), likes / rng.gen_range(50..=200));
                m.insert("saves".into(), likes / rng.gen_range(10..=30));
                m.insert("shares".into(), likes / rng.gen_range(100..=500));
                let views = if post_type == "reels" { likes * rng.gen_range(3..=10) } else { 0 };
                m.insert("views".into(), views);
                drawn.extras.insert("post_type".into(), json!(post_type));
                drawn.extras.insert("has_reels".into(), json!(post_type == "reels"));
            }
            Platform::TikTok => {
                let views = viral(rng.gen_range(10_000..=1_000_000));
                let like_ratio = Normal::new(0.10, 0.025)
                    .map_or(0.10_f64, |d| d.sample(rng))
                    .clamp(0.05, 0.15);
                m.insert("views".into(), views);
                m.insert("likes".into(), fraction(views, like_ratio));
                m.insert("comments".into(), fraction(views, rng.gen_range(0.005..=0.015)));
                m.insert("shares".into(), fraction(views, rng.gen_range(0.002..=0.008)));
                drawn.extras.insert("is_viral".into(), json!(event.viral_multiplier > 1.0));
            }
        }

        drawn
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn scale(base: u64, multiplier: f64) -> u64 {
    (base as f64 * multiplier).round().max(0.0) as u64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn fraction(total: u64, ratio: f64) -> u64 {
    (total as f64 * ratio).floor().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_event_distribution_roughly_half_normal() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = (0..2_000).filter(|_| MarketEvent::draw(&mut rng).is_normal()).count();
        assert!((800..1_200).contains(&normal), "normal events: {normal}");
    }

    #[test]
    fn test_normal_event_never_viral() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let event = MarketEvent::draw(&mut rng);
            if event.is_normal() {
                assert!((event.viral_multiplier - 1.0).abs() < f64::EPSILON);
                assert!(event.sentiment_shift.abs() <= 0.15);
            } else {
                assert!(event.viral_multiplier >= 2.0);
            }
        }
    }

    #[test]
    fn test_positive_ratio_clamped() {
        let profile = PlatformProfile::for_platform(Platform::Reddit);
        let boom = MarketEvent { name: "Award", sentiment_shift: 0.8, viral_multiplier: 6.0 };
        let bust = MarketEvent { name: "Scandal", sentiment_shift: -0.8, viral_multiplier: 6.0 };
        assert!((profile.positive_ratio(&boom) - 1.0).abs() < f64::EPSILON);
        assert!(profile.positive_ratio(&bust) >= 0.0);
    }

    #[test]
    fn test_metric_shapes_per_platform() {
        let mut rng = StdRng::seed_from_u64(3);
        let calm = MarketEvent { name: "normal", sentiment_shift: 0.0, viral_multiplier: 1.0 };

        let reddit = PlatformProfile::for_platform(Platform::Reddit).draw_metrics(&mut rng, &calm);
        assert!(reddit.metrics.contains_key("upvotes"));
        assert!(reddit.metrics.contains_key("awards"));

        let twitter = PlatformProfile::for_platform(Platform::Twitter).draw_metrics(&mut rng, &calm);
        assert!(twitter.metrics["retweets"] <= twitter.metrics["likes"]);

        let insta = PlatformProfile::for_platform(Platform::Instagram).draw_metrics(&mut rng, &calm);
        assert!(insta.extras.contains_key("post_type"));

        let tiktok = PlatformProfile::for_platform(Platform::TikTok).draw_metrics(&mut rng, &calm);
        let views = tiktok.metrics["views"];
        let likes = tiktok.metrics["likes"];
        assert!(likes + 1 >= views / 20 && likes <= views * 15 / 100 + 1);
    }
}
