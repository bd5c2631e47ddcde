//! Pattern lexicon engine.
//!
//! Averages the polarity of the opinion words found in a text. An
//! intensifier directly before a word scales it; a negation within the two
//! preceding words flips and halves it.

use std::collections::HashMap;

use super::{ensure_finite, SentimentEngine, SentimentError};

/// Multiplier for a negated opinion word.
const NEGATION_FACTOR: f64 = -0.5;

const ADJECTIVES: &[(&str, f64)] = &[
    ("acceptable", 0.5),
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("cheaper", 0.2),
    ("excited", 0.375),
    ("fair", 0.7),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("fresh", 0.3),
    ("friendly", 0.375),
    ("fun", 0.3),
    ("good", 0.7),
    ("gorgeous", 0.7),
    ("great", 0.8),
    ("happier", 0.8),
    ("happy", 0.8),
    ("impressed", 1.0),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("love", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("proud", 0.8),
    ("responsible", 0.2),
    ("smooth", 0.4),
    ("stunning", 0.5),
    ("useful", 0.3),
    ("angry", -0.5),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("broken", -0.4),
    ("defective", -0.5),
    ("depressing", -0.35),
    ("disappointing", -0.6),
    ("embarrassing", -0.3),
    ("empty", -0.1),
    ("expensive", -0.5),
    ("furious", -0.8),
    ("lazy", -0.25),
    ("pointless", -0.5),
    ("ridiculous", -0.33),
    ("sad", -0.5),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("tired", -0.4),
    ("useless", -0.5),
    ("worried", -0.3),
    ("worse", -0.4),
    ("worst", -1.0),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("pretty", 1.1),
    ("really", 1.2),
    ("seriously", 1.2),
    ("so", 1.3),
    ("super", 1.3),
    ("totally", 1.2),
    ("very", 1.3),
    ("slightly", 0.7),
    ("somewhat", 0.8),
];

const NEGATIONS: &[&str] = &["never", "no", "not", "nothing", "without"];

/// Adjective-averaging polarity engine.
pub struct PatternLexiconEngine {
    adjectives: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
}

impl PatternLexiconEngine {
    pub fn new() -> Self {
        Self {
            adjectives: ADJECTIVES.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl Default for PatternLexiconEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

impl SentimentEngine for PatternLexiconEngine {
    fn name(&self) -> &'static str {
        "pattern-lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let words: Vec<String> = text
            .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let mut assessments = Vec::new();
        for (i, word) in words.iter().enumerate() {
            let Some(&base) = self.adjectives.get(word.as_str()) else {
                continue;
            };
            let mut polarity = base;
            if let Some(factor) = i
                .checked_sub(1)
                .and_then(|j| self.intensifiers.get(words[j].as_str()))
            {
                polarity = (polarity * factor).clamp(-1.0, 1.0);
            }
            if words[i.saturating_sub(2)..i].iter().any(|w| is_negation(w)) {
                polarity *= NEGATION_FACTOR;
            }
            assessments.push(polarity);
        }

        if assessments.is_empty() {
            return Ok(0.0);
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        ensure_finite(self.name(), mean).map(|m| m.clamp(-1.0, 1.0))
    }
}
