//! Plain-text rendering of pipeline outcomes for the terminal.

use std::fmt::Write as _;

use newsvox_pipeline::{NoResultsReason, PipelineOutcome, PipelineResult, Sentiment};

pub(crate) fn render_outcome(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Found(result) => render_result(result),
        PipelineOutcome::NoResults { company, reason } => {
            let detail = match reason {
                NoResultsReason::FetchFailed => "the search page could not be fetched",
                NoResultsReason::NoArticles => "no articles matched",
            };
            format!("No news articles found for '{company}' ({detail}).\n")
        }
    }
}

fn render_result(result: &PipelineResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Company: {}", result.company);
    let _ = writeln!(out);

    for (index, item) in result.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, item.item.title);
        let _ = writeln!(out, "   Summary: {}", item.item.summary);
        let _ = writeln!(
            out,
            "   Sentiment: {} ({:.3})",
            item.sentiment, item.polarity
        );
        if item.translation_fallback {
            let _ = writeln!(out, "   Translation unavailable, narrating source text");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Sentiment distribution:");
    for sentiment in Sentiment::ALL {
        let _ = writeln!(out, "  {:<10}{}", sentiment, result.tally.count(sentiment));
    }

    for difference in &result.comparative.coverage_differences {
        let _ = writeln!(out, "Comparison: {}", difference.comparison);
        let _ = writeln!(out, "Impact: {}", difference.impact);
    }

    let _ = writeln!(out, "Final sentiment: {}", result.final_sentiment);
    let _ = writeln!(out, "Audio: {}", result.audio_path.display());
    out
}
