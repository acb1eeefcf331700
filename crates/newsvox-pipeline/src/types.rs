use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::analysis::ComparativeAnalysis;

/// One article snippet pulled from the search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// Trimmed paragraph text. May be empty when the element exists but has no text.
    pub summary: String,
}

/// Sentiment label derived from a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A [`NewsItem`] after scoring and translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedItem {
    #[serde(flatten)]
    pub item: NewsItem,
    /// Polarity in `[-1.0, 1.0]` as reported by the scorer.
    pub polarity: f64,
    pub sentiment: Sentiment,
    pub translated_summary: String,
    /// `true` when translation failed and `translated_summary` holds the source text.
    pub translation_fallback: bool,
}

/// Per-label counts. Always serializes all three labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentTally {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
}

impl SentimentTally {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

impl FromIterator<Sentiment> for SentimentTally {
    fn from_iter<I: IntoIterator<Item = Sentiment>>(iter: I) -> Self {
        let mut tally = Self::default();
        for sentiment in iter {
            tally.record(sentiment);
        }
        tally
    }
}

/// Full output of one successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub company: String,
    pub items: Vec<ClassifiedItem>,
    pub tally: SentimentTally,
    pub comparative: ComparativeAnalysis,
    pub final_sentiment: String,
    pub narration: String,
    pub audio_path: PathBuf,
}

/// Why a run produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultsReason {
    /// The search page could not be fetched (transport error or non-2xx status).
    FetchFailed,
    /// The page was fetched but no complete article matched the selectors.
    NoArticles,
}

/// Discriminated pipeline result: either a full record or the "no news" sentinel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Found(PipelineResult),
    NoResults {
        company: String,
        reason: NoResultsReason,
    },
}

/// Settings for the default (remote) pipeline collaborators.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub search_base_url: String,
    pub translate_base_url: String,
    pub tts_base_url: String,
    pub user_agent: String,
    pub source_language: String,
    pub target_language: String,
    pub item_concurrency: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &newsvox_core::AppConfig) -> Self {
        Self {
            search_base_url: config.search_base_url.clone(),
            translate_base_url: config.translate_base_url.clone(),
            tts_base_url: config.tts_base_url.clone(),
            user_agent: config.user_agent.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            item_concurrency: config.item_concurrency,
            request_timeout_secs: config.request_timeout_secs,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}
