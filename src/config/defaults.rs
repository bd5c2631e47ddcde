//! System-wide default constants.
//!
//! Fixed scoring constants and other values that are deliberately not
//! operator-tunable. Grouped by subsystem for easy discovery.

// ============================================================================
// Hybrid Sentiment
// ============================================================================

/// Weight of the social-media lexicon engine in the hybrid score.
pub const SOCIAL_ENGINE_WEIGHT: f64 = 0.6;

/// Weight of the pattern lexicon engine in the hybrid score.
pub const PATTERN_ENGINE_WEIGHT: f64 = 0.4;

/// Scores strictly above this are `very_positive`.
pub const VERY_POSITIVE_ABOVE: f64 = 0.5;

/// Scores strictly above this (and not above 0.5) are `positive`.
pub const POSITIVE_ABOVE: f64 = 0.1;

/// Scores strictly above this (and not above 0.1) are `neutral`.
pub const NEUTRAL_ABOVE: f64 = -0.1;

/// Scores strictly above this (and not above -0.1) are `negative`.
pub const NEGATIVE_ABOVE: f64 = -0.5;

// ============================================================================
// Business Potential
// ============================================================================

/// Engagement contribution weight (points per unit engagement rate).
pub const ENGAGEMENT_POINTS: f64 = 40.0;

/// Bonus points for a positive or very positive post.
pub const POSITIVE_BONUS_POINTS: f64 = 30.0;

/// Bonus points for a neutral post.
pub const NEUTRAL_BONUS_POINTS: f64 = 15.0;

/// Follower reach contribution weight.
pub const REACH_POINTS: f64 = 20.0;

/// Followers at which reach saturates.
pub const REACH_SATURATION_FOLLOWERS: f64 = 100_000.0;

/// Like-count contribution weight.
pub const LIKES_POINTS: f64 = 10.0;

/// Likes at which the like contribution saturates.
pub const LIKES_SATURATION: f64 = 10_000.0;

/// Upper bound of the 0..=10 business potential scale.
pub const MAX_BUSINESS_POTENTIAL: u8 = 10;

/// Metric keys summed into the engagement numerator.
pub const ENGAGEMENT_METRICS: [&str; 4] = ["likes", "comments", "shares", "retweets"];

// ============================================================================
// Market Opportunity
// ============================================================================

/// Growth contribution weight.
pub const OPPORTUNITY_GROWTH_POINTS: f64 = 30.0;

/// Positive-ratio contribution weight.
pub const OPPORTUNITY_POSITIVE_POINTS: f64 = 40.0;

/// Confidence contribution weight.
pub const OPPORTUNITY_CONFIDENCE_POINTS: f64 = 30.0;

/// Upper bound of the 0..=100 market opportunity scale.
pub const MAX_MARKET_OPPORTUNITY: u8 = 100;

// ============================================================================
// Simulation
// ============================================================================

/// Youngest simulated post age (minutes).
pub const SIM_MIN_POST_AGE_MINUTES: i64 = 1;

/// Oldest simulated post age (minutes).
pub const SIM_MAX_POST_AGE_MINUTES: i64 = 30;

// ============================================================================
// Dashboard Events
// ============================================================================

/// Capacity of the broadcast channel feeding WebSocket subscribers.
///
/// Five events per cycle; slow subscribers skip ahead once they lag past this.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
