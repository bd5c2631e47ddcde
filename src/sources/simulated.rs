//! Simulated platform sources.
//!
//! Each [`SimulatedSource`] generates a fresh batch of posts per call: a
//! market event is drawn, then every business category gets a handful of
//! posts whose polarity mix, author reach and interaction counts follow the
//! platform's [`PlatformProfile`].

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::profile::{MarketEvent, PlatformProfile};
use super::{templates, PostSource, SourceError};
use crate::config::defaults::{SIM_MAX_POST_AGE_MINUTES, SIM_MIN_POST_AGE_MINUTES};
use crate::config::SimulationConfig;
use crate::types::{BusinessCategory, Platform, Post};

/// Generates synthetic posts for one platform.
pub struct SimulatedSource {
    name: String,
    profile: PlatformProfile,
    rng: Mutex<StdRng>,
    iteration: AtomicU64,
    next_post_no: AtomicU64,
    delay_ms: (u64, u64),
}

impl SimulatedSource {
    /// Source with an entropy-seeded RNG and no artificial latency.
    pub fn new(platform: Platform) -> Self {
        Self::build(platform, StdRng::from_entropy(), (0, 0))
    }

    /// Deterministic source: the same seed yields the same batches.
    pub fn with_seed(platform: Platform, seed: u64) -> Self {
        Self::build(platform, StdRng::seed_from_u64(seed), (0, 0))
    }

    /// Add a random delay in `[min_ms, max_ms]` before each batch.
    #[must_use]
    pub const fn with_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.delay_ms = (min_ms, max_ms);
        self
    }

    fn build(platform: Platform, rng: StdRng, delay_ms: (u64, u64)) -> Self {
        Self {
            name: format!("{}-sim", platform.as_str()),
            profile: PlatformProfile::for_platform(platform),
            rng: Mutex::new(rng),
            iteration: AtomicU64::new(0),
            next_post_no: AtomicU64::new(0),
            delay_ms,
        }
    }

    pub const fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// Generate one batch synchronously.
    pub fn generate(&self) -> Vec<Post> {
        let iteration = self.iteration.fetch_add(1, Ordering::Relaxed) + 1;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let event = MarketEvent::draw(&mut *rng);
        let positive_ratio = self.profile.positive_ratio(&event);
        if event.is_normal() {
            debug!(source = %self.name, iteration, "Normal market conditions");
        } else {
            info!(
                source = %self.name,
                iteration,
                event = event.name,
                shift = %format!("{:+.2}", event.sentiment_shift),
                viral = %format!("x{:.1}", event.viral_multiplier),
                "🎯 Market event"
            );
        }

        let now = Utc::now();
        let platform = self.profile.platform;
        let mut posts = Vec::new();

        for category in BusinessCategory::ALL {
            for _ in 0..self.profile.draw_post_count(&mut *rng) {
                let post_no = self.next_post_no.fetch_add(1, Ordering::Relaxed);
                let positive = rng.gen_bool(positive_ratio);
                let content = templates::pick(category, positive, &mut *rng);
                let author = self.profile.draw_author(&mut *rng);
                let followers = self.profile.draw_followers(&mut *rng);
                let age = rng.gen_range(SIM_MIN_POST_AGE_MINUTES..=SIM_MAX_POST_AGE_MINUTES);
                let drawn = self.profile.draw_metrics(&mut *rng, &event);

                let mut post = Post::new(
                    format!("{}_{iteration}_{post_no}", platform.as_str()),
                    platform,
                    category,
                    content,
                )
                .with_url(self.profile.url(category, &author, post_no))
                .with_author(author, followers)
                .with_created_at(now - chrono::Duration::minutes(age));

                post.metrics = drawn.metrics;
                post.metadata = drawn.extras;
                post.metadata.insert("iteration".into(), json!(iteration));
                post.metadata.insert("event".into(), json!(event.name));
                if platform == Platform::Reddit {
                    post.metadata.insert("subreddit".into(), json!(format!("r/{category}")));
                }

                posts.push(post);
            }
        }

        posts
    }

    fn draw_delay(&self) -> Duration {
        let (lo, hi) = self.delay_ms;
        if hi == 0 {
            return Duration::ZERO;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Duration::from_millis(rng.gen_range(lo..=hi.max(lo)))
    }
}

#[async_trait]
impl PostSource for SimulatedSource {
    async fn collect(&self) -> Result<Vec<Post>, SourceError> {
        let delay = self.draw_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.generate())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> Platform {
        self.profile.platform
    }
}

/// One simulated source per platform, configured from `[simulation]`.
///
/// With a seed, each platform derives its own stream so batches stay
/// reproducible while differing between platforms.
pub fn simulated_sources(config: &SimulationConfig) -> Vec<Arc<dyn PostSource>> {
    Platform::ALL
        .iter()
        .enumerate()
        .map(|(i, platform)| {
            let source = match config.seed {
                Some(seed) => SimulatedSource::with_seed(*platform, seed.wrapping_add(i as u64)),
                None => SimulatedSource::new(*platform),
            }
            .with_delay(config.min_delay_ms, config.max_delay_ms);
            Arc::new(source) as Arc<dyn PostSource>
        })
        .collect()
}
