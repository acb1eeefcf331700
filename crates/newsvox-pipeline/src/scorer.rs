//! Polarity scoring and sentiment classification for news summaries.

use crate::types::Sentiment;

/// Polarity strictly above this is `Positive`.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Polarity strictly below this is `Negative`.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Multiplier applied to a word preceded by a negator ("not good").
const NEGATION_FACTOR: f64 = -0.5;

/// Produces a polarity score in `[-1.0, 1.0]` for a piece of text.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Map a polarity to a label using the fixed strict thresholds.
#[must_use]
pub fn classify_polarity(polarity: f64) -> Sentiment {
    if polarity > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if polarity < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Word weights for business and company news.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("strong", 0.4),
    ("stronger", 0.4),
    ("positive", 0.2),
    ("gain", 0.4),
    ("gains", 0.4),
    ("growth", 0.4),
    ("growing", 0.3),
    ("grew", 0.3),
    ("rise", 0.3),
    ("rises", 0.3),
    ("rose", 0.3),
    ("surge", 0.5),
    ("surges", 0.5),
    ("soar", 0.6),
    ("soars", 0.6),
    ("record", 0.3),
    ("profit", 0.4),
    ("profitable", 0.5),
    ("beat", 0.3),
    ("beats", 0.3),
    ("success", 0.6),
    ("successful", 0.7),
    ("win", 0.5),
    ("wins", 0.5),
    ("boost", 0.4),
    ("boosts", 0.4),
    ("innovative", 0.5),
    ("best", 1.0),
    ("better", 0.5),
    ("optimistic", 0.5),
    ("upgrade", 0.4),
    ("expands", 0.3),
    ("expansion", 0.3),
    ("launch", 0.2),
    ("launches", 0.2),
    ("approval", 0.4),
    ("approved", 0.4),
    ("popular", 0.6),
    ("impressive", 1.0),
    ("happy", 0.8),
    // Negative signals
    ("bad", -0.7),
    ("poor", -0.4),
    ("weak", -0.4),
    ("weaker", -0.4),
    ("negative", -0.3),
    ("loss", -0.5),
    ("losses", -0.5),
    ("lose", -0.5),
    ("fall", -0.3),
    ("falls", -0.3),
    ("fell", -0.3),
    ("drop", -0.3),
    ("drops", -0.3),
    ("decline", -0.4),
    ("declines", -0.4),
    ("plunge", -0.6),
    ("plunges", -0.6),
    ("slump", -0.5),
    ("crash", -0.7),
    ("miss", -0.3),
    ("misses", -0.3),
    ("lawsuit", -0.5),
    ("sued", -0.5),
    ("fraud", -0.8),
    ("scandal", -0.7),
    ("recall", -0.5),
    ("layoffs", -0.5),
    ("cuts", -0.3),
    ("downgrade", -0.4),
    ("warning", -0.4),
    ("warns", -0.4),
    ("risk", -0.2),
    ("concern", -0.3),
    ("concerns", -0.3),
    ("crisis", -0.6),
    ("failure", -0.6),
    ("failed", -0.5),
    ("worst", -1.0),
    ("worse", -0.6),
    ("terrible", -1.0),
    ("fine", -0.2),
    ("penalty", -0.5),
    ("investigation", -0.3),
    ("bankruptcy", -0.8),
];

/// Words that scale the weight of the next sentiment word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("sharply", 1.4),
    ("slightly", 0.5),
    ("somewhat", 0.7),
];

const NEGATORS: &[&str] = &["not", "no", "never", "without", "hardly", "neither", "nor"];

fn weight(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, weight)| weight)
}

fn intensifier(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, factor)| factor)
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't")
}

/// Score `text` with the news lexicon.
///
/// Each matched word contributes its weight, scaled by any immediately
/// preceding intensifiers and multiplied by `-0.5` when preceded by a negator.
/// The result is the mean of the contributions, clamped to `[-1.0, 1.0]`.
/// Text with no matched words scores `0.0`.
#[must_use]
pub fn lexicon_polarity(text: &str) -> f64 {
    let mut total = 0.0_f64;
    let mut matched = 0_u32;
    let mut negate = false;
    let mut intensity = 1.0_f64;

    for raw in text.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
            .replace('\u{2019}', "'")
            .to_lowercase();
        if word.is_empty() {
            continue;
        }

        if is_negator(&word) {
            negate = true;
            continue;
        }
        if let Some(factor) = intensifier(&word) {
            intensity *= factor;
            continue;
        }

        if let Some(w) = weight(&word) {
            let mut value = w * intensity;
            if negate {
                value *= NEGATION_FACTOR;
            }
            total += value;
            matched += 1;
        }

        negate = false;
        intensity = 1.0;
    }

    if matched == 0 {
        return 0.0;
    }
    (total / f64::from(matched)).clamp(-1.0, 1.0)
}

/// Default scorer backed by [`lexicon_polarity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        lexicon_polarity(text)
    }
}
