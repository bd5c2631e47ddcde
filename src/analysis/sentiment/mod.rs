//! Hybrid sentiment scoring.
//!
//! Two independent lexicon engines score the same text; the hybrid score is
//! their fixed-weight blend, clamped to `[-1, 1]`.

mod pattern;
mod social;

pub use pattern::PatternLexiconEngine;
pub use social::SocialLexiconEngine;

use crate::config::defaults::{PATTERN_ENGINE_WEIGHT, SOCIAL_ENGINE_WEIGHT};

/// Sentiment scoring failures.
#[derive(Debug, thiserror::Error)]
pub enum SentimentError {
    #[error("{engine} produced a non-finite score ({value})")]
    NonFinite { engine: &'static str, value: f64 },

    #[error("{engine} failed: {message}")]
    Engine { engine: &'static str, message: String },
}

/// A single polarity engine.
///
/// Implementations must be pure: the same text always yields the same
/// polarity, and no state is shared between calls.
pub trait SentimentEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Polarity of `text` in `[-1, 1]`.
    fn polarity(&self, text: &str) -> Result<f64, SentimentError>;
}

pub(crate) fn ensure_finite(engine: &'static str, value: f64) -> Result<f64, SentimentError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SentimentError::NonFinite { engine, value })
    }
}

/// Weighted blend of the social-media engine and the pattern engine.
pub struct HybridScorer {
    social: Box<dyn SentimentEngine>,
    pattern: Box<dyn SentimentEngine>,
}

impl HybridScorer {
    pub fn new(social: Box<dyn SentimentEngine>, pattern: Box<dyn SentimentEngine>) -> Self {
        Self { social, pattern }
    }

    /// Scorer with the built-in lexicon engines.
    pub fn standard() -> Self {
        Self::new(
            Box::new(SocialLexiconEngine::new()),
            Box::new(PatternLexiconEngine::new()),
        )
    }

    /// Hybrid polarity of `text`.
    ///
    /// Blank text scores 0.0 without consulting either engine.
    pub fn score(&self, text: &str) -> Result<f64, SentimentError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let social = self.social.polarity(text)?;
        let pattern = self.pattern.polarity(text)?;
        let blended = SOCIAL_ENGINE_WEIGHT * social + PATTERN_ENGINE_WEIGHT * pattern;
        Ok(ensure_finite("hybrid", blended)?.clamp(-1.0, 1.0))
    }

    /// Names of the two engines, social first.
    pub fn engine_names(&self) -> (&'static str, &'static str) {
        (self.social.name(), self.pattern.name())
    }
}

impl Default for HybridScorer {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed {
        value: f64,
        calls: Arc<AtomicUsize>,
    }

    impl SentimentEngine for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn polarity(&self, _text: &str) -> Result<f64, SentimentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }
    }

    fn fixed(social: f64, pattern: f64) -> (HybridScorer, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scorer = HybridScorer::new(
            Box::new(Fixed { value: social, calls: Arc::clone(&calls) }),
            Box::new(Fixed { value: pattern, calls: Arc::clone(&calls) }),
        );
        (scorer, calls)
    }

    #[test]
    fn test_blank_text_skips_engines() {
        let (scorer, calls) = fixed(1.0, 1.0);
        assert_eq!(scorer.score("").unwrap(), 0.0);
        assert_eq!(scorer.score("   \n\t").unwrap(), 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_weighted_blend() {
        let (scorer, calls) = fixed(0.5, -0.5);
        // 0.6 * 0.5 + 0.4 * -0.5
        assert!((scorer.score("anything").unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_out_of_range_engines_are_clamped() {
        let (scorer, _) = fixed(3.0, 3.0);
        assert_eq!(scorer.score("x").unwrap(), 1.0);
    }

    #[test]
    fn test_non_finite_engine_output_is_an_error() {
        let (scorer, _) = fixed(f64::NAN, 0.0);
        assert!(matches!(
            scorer.score("x"),
            Err(SentimentError::NonFinite { engine: "hybrid", .. })
        ));
    }

    #[test]
    fn test_standard_engines_agree_on_direction() {
        let scorer = HybridScorer::standard();
        assert!(scorer.score("This is amazing, I love it").unwrap() > 0.1);
        assert!(scorer.score("Terrible and useless, worst purchase").unwrap() < -0.1);
        assert_eq!(scorer.engine_names(), ("social-lexicon", "pattern-lexicon"));
    }
}
