//! Trend stage: keyword volume, growth and market opportunity ranking.

mod detector;

pub use detector::{growth_rate, TrendAggregator, TrendDetection, TrendError, VolumeMap};
