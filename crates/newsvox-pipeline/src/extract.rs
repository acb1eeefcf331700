//! Article extraction from a search results page.

use scraper::{ElementRef, Html, Selector};

use crate::error::PipelineError;
use crate::types::NewsItem;

pub const DEFAULT_CONTAINER_SELECTOR: &str = "div.NewsArticle";
pub const DEFAULT_TITLE_SELECTOR: &str = "h4";
pub const DEFAULT_SUMMARY_SELECTOR: &str = "p";

/// CSS selectors describing one result card: a repeating container holding a
/// title element and a summary element.
#[derive(Debug, Clone)]
pub struct Selectors {
    container: Selector,
    title: Selector,
    summary: Selector,
}

impl Selectors {
    /// Parses the three selectors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Selector`] naming the first selector that fails to parse.
    pub fn new(container: &str, title: &str, summary: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            container: parse_selector(container)?,
            title: parse_selector(title)?,
            summary: parse_selector(summary)?,
        })
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONTAINER_SELECTOR,
            DEFAULT_TITLE_SELECTOR,
            DEFAULT_SUMMARY_SELECTOR,
        )
        .expect("default selectors are valid CSS")
    }
}

fn parse_selector(raw: &str) -> Result<Selector, PipelineError> {
    Selector::parse(raw).map_err(|e| PipelineError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extract up to `max_items` complete articles from `html`, in document order.
///
/// A container without a title element or without a summary element is
/// skipped and does not count toward `max_items`.
#[must_use]
pub fn extract_news_items(html: &str, selectors: &Selectors, max_items: usize) -> Vec<NewsItem> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for container in document.select(&selectors.container) {
        if items.len() >= max_items {
            break;
        }

        let title = container.select(&selectors.title).next();
        let summary = container.select(&selectors.summary).next();
        let (Some(title), Some(summary)) = (title, summary) else {
            tracing::debug!(
                has_title = title.is_some(),
                has_summary = summary.is_some(),
                "skipping incomplete result card"
            );
            continue;
        };

        items.push(NewsItem {
            title: element_text(title),
            summary: element_text(summary),
        });
    }

    items
}
