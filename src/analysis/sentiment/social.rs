//! Social-media lexicon engine.
//!
//! Valence lexicon scored token by token with the heuristics that matter on
//! social platforms: emoji, ALL-CAPS emphasis, degree boosters, negation,
//! contrastive "but", and exclamation marks. The summed valence is squashed
//! into `[-1, 1]` with `x / sqrt(x² + α)`.

use std::collections::HashMap;

use super::{ensure_finite, SentimentEngine, SentimentError};

/// Normalisation constant for the compound squash.
const ALPHA: f64 = 15.0;

/// Valence added by a booster word directly before a sentiment word.
const BOOST_INCREMENT: f64 = 0.293;

/// Valence added to an ALL-CAPS sentiment word in mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;

/// Multiplier applied to a negated sentiment word.
const NEGATION_SCALAR: f64 = -0.74;

/// Emphasis added per exclamation mark, capped at four marks.
const EXCLAMATION_INCREMENT: f64 = 0.292;

/// Emphasis added per question mark once there are at least two.
const QUESTION_INCREMENT: f64 = 0.18;

const LEXICON: &[(&str, f64)] = &[
    // positive
    ("acceptable", 1.3),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("boosted", 1.3),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fair", 1.3),
    ("fairly", 1.0),
    ("fantastic", 2.6),
    ("fresh", 1.3),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("good", 1.9),
    ("gorgeous", 3.0),
    ("great", 3.1),
    ("happier", 2.4),
    ("happy", 2.7),
    ("impressed", 2.1),
    ("impressive", 2.3),
    ("incredible", 2.6),
    ("inspiring", 2.2),
    ("like", 1.5),
    ("love", 3.2),
    ("loving", 2.9),
    ("masterpiece", 3.1),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("profitability", 1.5),
    ("proud", 2.1),
    ("smooth", 1.2),
    ("stunning", 2.4),
    ("success", 2.7),
    ("talent", 1.8),
    ("thriving", 2.0),
    ("useful", 1.9),
    ("win", 2.8),
    ("win-win", 2.8),
    ("wonderful", 2.7),
    // negative
    ("angry", -2.3),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -1.5),
    ("cancelled", -1.0),
    ("collapsed", -1.8),
    ("crashed", -1.7),
    ("crashes", -1.7),
    ("defective", -1.9),
    ("delays", -1.0),
    ("depressing", -1.6),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disaster", -3.1),
    ("embarrassing", -1.6),
    ("empty", -0.8),
    ("fail", -2.3),
    ("failed", -2.3),
    ("furious", -2.7),
    ("greed", -1.7),
    ("greenwashing", -1.5),
    ("hate", -2.7),
    ("hurt", -2.4),
    ("hype", -0.5),
    ("killed", -3.5),
    ("lazy", -1.5),
    ("layoffs", -1.8),
    ("lost", -1.3),
    ("misleading", -1.7),
    ("nightmare", -2.0),
    ("outage", -1.5),
    ("pointless", -1.5),
    ("problem", -1.7),
    ("refused", -1.2),
    ("ridiculous", -1.7),
    ("ripoff", -2.0),
    ("ruining", -2.1),
    ("sad", -2.1),
    ("scam", -2.3),
    ("terrible", -2.1),
    ("tired", -1.9),
    ("useless", -1.8),
    ("waste", -1.8),
    ("worried", -1.2),
    ("worse", -2.1),
    ("worst", -3.1),
    // emoji
    ("🚀", 2.0),
    ("🎉", 2.5),
    ("🌿", 1.0),
    ("📈", 1.5),
    ("📉", -1.5),
    ("✨", 1.5),
    ("🔥", 1.5),
    ("❤️", 3.0),
    ("❤", 3.0),
    ("🙌", 2.0),
    ("👎", -2.0),
    ("😡", -2.8),
    ("😤", -2.0),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCREMENT),
    ("extremely", BOOST_INCREMENT),
    ("incredibly", BOOST_INCREMENT),
    ("really", BOOST_INCREMENT),
    ("seriously", BOOST_INCREMENT),
    ("so", BOOST_INCREMENT),
    ("super", BOOST_INCREMENT),
    ("totally", BOOST_INCREMENT),
    ("very", BOOST_INCREMENT),
    ("barely", -BOOST_INCREMENT),
    ("kinda", -BOOST_INCREMENT),
    ("slightly", -BOOST_INCREMENT),
    ("somewhat", -BOOST_INCREMENT),
];

const NEGATIONS: &[&str] = &[
    "aint", "cannot", "never", "no", "nobody", "none", "nor", "not", "nothing", "nowhere",
    "without",
];

/// Social-media tuned valence engine.
pub struct SocialLexiconEngine {
    lexicon: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
}

impl SocialLexiconEngine {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
        }
    }

    fn is_negation(word: &str) -> bool {
        NEGATIONS.contains(&word) || word.ends_with("n't")
    }

    fn is_shouting(token: &str) -> bool {
        let letters: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
        letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
    }

    /// Valence of the token at `i`, after booster, caps and negation rules.
    fn token_valence(&self, tokens: &[Token<'_>], i: usize, mixed_case: bool) -> Option<f64> {
        let token = &tokens[i];
        let mut valence = *self.lexicon.get(token.lower.as_str())?;

        if mixed_case && Self::is_shouting(token.raw) {
            valence += CAPS_INCREMENT.copysign(valence);
        }

        for (distance, scale) in [(1, 1.0), (2, 0.95), (3, 0.9)] {
            let Some(prev) = i.checked_sub(distance).map(|j| &tokens[j]) else {
                break;
            };
            if let Some(boost) = self.boosters.get(prev.lower.as_str()) {
                // Boosters grow the magnitude, dampeners shrink it.
                valence += boost * scale * valence.signum();
            }
            if Self::is_negation(&prev.lower) {
                valence *= NEGATION_SCALAR;
            }
        }

        Some(valence)
    }
}

impl Default for SocialLexiconEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|t| !t.is_empty())
        .map(|raw| Token { raw, lower: raw.to_lowercase() })
        .collect()
}

impl SentimentEngine for SocialLexiconEngine {
    fn name(&self) -> &'static str {
        "social-lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64, SentimentError> {
        let tokens = tokenize(text);
        let mixed_case = text.chars().any(char::is_lowercase);

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            valences.push(self.token_valence(&tokens, i, mixed_case).unwrap_or(0.0));
        }

        // Contrast: "X but Y" puts the weight on Y.
        if let Some(pivot) = tokens.iter().rposition(|t| t.lower == "but") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *v *= 0.5;
                } else if i > pivot {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return Ok(0.0);
        }

        let exclamations = text.matches('!').count().min(4) as f64;
        let questions = text.matches('?').count();
        let mut emphasis = exclamations * EXCLAMATION_INCREMENT;
        if questions > 1 {
            emphasis += questions.min(3) as f64 * QUESTION_INCREMENT;
        }
        sum += emphasis.copysign(sum);

        let compound = sum / (sum * sum + ALPHA).sqrt();
        ensure_finite(self.name(), compound).map(|c| c.clamp(-1.0, 1.0))
    }
}
