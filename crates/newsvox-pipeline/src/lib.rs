//! News sentiment pipeline for newsvox.
//!
//! Scrapes a news search page for a company, classifies each article summary
//! with a polarity scorer, tallies the labels, translates the summaries and
//! renders the joined translations to an MP3 narration.

pub mod analysis;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod scorer;
pub mod search;
pub mod translate;
pub mod tts;
pub mod types;

mod retry;

pub use analysis::{
    comparative_analysis, ComparativeAnalysis, CoverageDifference, FINAL_SENTIMENT_ANALYSIS,
};
pub use error::PipelineError;
pub use extract::{extract_news_items, Selectors};
pub use pipeline::{build_narration, NewsSentimentPipeline, RunOptions, MAX_ITEMS_LIMIT};
pub use scorer::{classify_polarity, lexicon_polarity, LexiconScorer, PolarityScorer};
pub use search::SearchClient;
pub use translate::{GoogleTranslateClient, Translator};
pub use tts::{split_for_speech, write_narration_audio, GoogleTtsClient, SpeechSynthesizer};
pub use types::{
    ClassifiedItem, NewsItem, NoResultsReason, PipelineConfig, PipelineOutcome, PipelineResult,
    Sentiment, SentimentTally,
};
