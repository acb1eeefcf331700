//! Comparative sentiment summary attached to every result.
//!
//! The coverage-difference narrative and the final verdict are fixed text; only
//! the sentiment distribution depends on the input.

use serde::Serialize;

use crate::types::{ClassifiedItem, SentimentTally};

pub const COVERAGE_COMPARISON: &str =
    "Some articles are positive while others discuss challenges.";
pub const COVERAGE_IMPACT: &str =
    "Positive news boosts investor confidence, while negative news may cause concerns.";
pub const FINAL_SENTIMENT_ANALYSIS: &str = "Overall, the news coverage is mixed.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageDifference {
    pub comparison: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparativeAnalysis {
    pub sentiment_distribution: SentimentTally,
    pub coverage_differences: Vec<CoverageDifference>,
}

#[must_use]
pub fn comparative_analysis(items: &[ClassifiedItem]) -> ComparativeAnalysis {
    ComparativeAnalysis {
        sentiment_distribution: items.iter().map(|i| i.sentiment).collect(),
        coverage_differences: vec![CoverageDifference {
            comparison: COVERAGE_COMPARISON.to_string(),
            impact: COVERAGE_IMPACT.to_string(),
        }],
    }
}
