//! News sentiment pipeline orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::analysis::{comparative_analysis, FINAL_SENTIMENT_ANALYSIS};
use crate::error::PipelineError;
use crate::extract::{extract_news_items, Selectors};
use crate::scorer::{classify_polarity, LexiconScorer, PolarityScorer};
use crate::search::SearchClient;
use crate::translate::{GoogleTranslateClient, Translator};
use crate::tts::{write_narration_audio, GoogleTtsClient, SpeechSynthesizer};
use crate::types::{
    ClassifiedItem, NewsItem, NoResultsReason, PipelineConfig, PipelineOutcome, PipelineResult,
    SentimentTally,
};

pub const DEFAULT_MAX_ITEMS: usize = 5;
/// Upper bound on `max_items` accepted from callers.
pub const MAX_ITEMS_LIMIT: usize = 20;
pub const DEFAULT_AUDIO_FILE: &str = "news_audio.mp3";

/// Per-run options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_items: usize,
    /// Where the narration MP3 is written.
    pub audio_path: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            audio_path: PathBuf::from(DEFAULT_AUDIO_FILE),
        }
    }
}

/// Fetch → extract → classify → aggregate → translate → narrate → synthesize.
///
/// The scorer, translator and synthesizer are trait objects so they can be
/// swapped (e.g. for local models or test doubles) without touching the flow.
pub struct NewsSentimentPipeline {
    search: SearchClient,
    selectors: Selectors,
    scorer: Arc<dyn PolarityScorer>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    source_language: String,
    target_language: String,
    item_concurrency: usize,
}

impl NewsSentimentPipeline {
    /// Builds a pipeline with the lexicon scorer and the remote translate/TTS clients.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any configured base URL is invalid or an
    /// HTTP client cannot be constructed.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let search = SearchClient::new(
            &config.search_base_url,
            &config.user_agent,
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        let translator = GoogleTranslateClient::new(
            &config.translate_base_url,
            &config.user_agent,
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;
        let synthesizer = GoogleTtsClient::new(
            &config.tts_base_url,
            &config.user_agent,
            config.request_timeout_secs,
            config.max_retries,
            config.retry_backoff_base_ms,
        )?;

        Ok(Self {
            search,
            selectors: Selectors::default(),
            scorer: Arc::new(LexiconScorer),
            translator: Arc::new(translator),
            synthesizer: Arc::new(synthesizer),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            item_concurrency: config.item_concurrency.max(1),
        })
    }

    #[must_use]
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn PolarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Run the full pipeline for one company.
    ///
    /// Returns `Ok(PipelineOutcome::NoResults)` when the search page cannot be
    /// fetched or yields no complete articles; in that case nothing is scored,
    /// translated or synthesized. Per-item translation failures fall back to
    /// the source text.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if speech synthesis or the audio file write fails.
    pub async fn run(
        &self,
        company: &str,
        options: &RunOptions,
    ) -> Result<PipelineOutcome, PipelineError> {
        let company = company.trim();
        tracing::info!(company, max_items = options.max_items, "starting news pipeline");

        let Some(html) = self.search.fetch_search_page(company).await else {
            return Ok(no_results(company, NoResultsReason::FetchFailed));
        };

        let items = extract_news_items(&html, &self.selectors, options.max_items);
        if items.is_empty() {
            tracing::info!(company, "no articles matched on search page");
            return Ok(no_results(company, NoResultsReason::NoArticles));
        }

        let classified: Vec<ClassifiedItem> = stream::iter(items)
            .map(|item| self.process_item(item))
            .buffered(self.item_concurrency)
            .collect()
            .await;

        let tally: SentimentTally = classified.iter().map(|i| i.sentiment).collect();
        debug_assert_eq!(tally.total(), classified.len());
        let comparative = comparative_analysis(&classified);

        let narration = build_narration(&classified);
        let audio_path = write_narration_audio(
            self.synthesizer.as_ref(),
            &narration,
            &self.target_language,
            &options.audio_path,
        )
        .await?;

        tracing::info!(
            company,
            items = classified.len(),
            positive = tally.positive,
            neutral = tally.neutral,
            negative = tally.negative,
            "news pipeline finished"
        );

        Ok(PipelineOutcome::Found(PipelineResult {
            company: company.to_string(),
            items: classified,
            tally,
            comparative,
            final_sentiment: FINAL_SENTIMENT_ANALYSIS.to_string(),
            narration,
            audio_path,
        }))
    }

    async fn process_item(&self, item: NewsItem) -> ClassifiedItem {
        let polarity = self.scorer.polarity(&item.summary);
        let sentiment = classify_polarity(polarity);

        if item.summary.trim().is_empty() {
            return ClassifiedItem {
                item,
                polarity,
                sentiment,
                translated_summary: String::new(),
                translation_fallback: false,
            };
        }

        let (translated_summary, translation_fallback) = match self
            .translator
            .translate(&item.summary, &self.source_language, &self.target_language)
            .await
        {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(
                    title = %item.title,
                    error = %e,
                    "translation failed, keeping source text"
                );
                (item.summary.clone(), true)
            }
        };

        ClassifiedItem {
            item,
            polarity,
            sentiment,
            translated_summary,
            translation_fallback,
        }
    }
}

fn no_results(company: &str, reason: NoResultsReason) -> PipelineOutcome {
    PipelineOutcome::NoResults {
        company: company.to_string(),
        reason,
    }
}

/// Space-join the translated summaries in item order, skipping blank ones.
#[must_use]
pub fn build_narration(items: &[ClassifiedItem]) -> String {
    items
        .iter()
        .map(|i| i.translated_summary.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
