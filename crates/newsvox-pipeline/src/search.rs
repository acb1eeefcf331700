//! HTTP client for the news search results page.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use crate::error::PipelineError;
use crate::retry::retry_with_backoff;

/// Fetches the search results page for a company.
///
/// Transient failures (timeouts, connection errors, 429, 5xx) are retried
/// with back-off. Any failure that survives the retry budget is reported as
/// `None` rather than an error.
pub struct SearchClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SearchClient {
    /// Creates a client for `base_url` (e.g. `https://news.search.yahoo.com`).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidUrl`] if `base_url` is not an http(s)
    /// origin, or [`PipelineError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, PipelineError> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Search URL for `company`, percent-encoded into the `p` query parameter.
    #[must_use]
    pub fn search_url(&self, company: &str) -> String {
        let encoded = utf8_percent_encode(company.trim(), NON_ALPHANUMERIC);
        format!("{}/search?p={encoded}", self.base_url)
    }

    /// Returns the page body on a 2xx response, `None` otherwise.
    pub async fn fetch_search_page(&self, company: &str) -> Option<String> {
        let url = self.search_url(company);

        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(PipelineError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
                Ok(response.text().await?)
            }
        })
        .await;

        match result {
            Ok(body) => {
                tracing::debug!(company, bytes = body.len(), "fetched search page");
                Some(body)
            }
            Err(e) => {
                tracing::warn!(company, error = %e, "search page fetch failed");
                None
            }
        }
    }
}

pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, PipelineError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let valid = reqwest::Url::parse(trimmed)
        .map_err(|e| e.to_string())
        .and_then(|url| match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(format!("unsupported scheme '{other}'")),
        });
    match valid {
        Ok(()) => Ok(trimmed.to_string()),
        Err(reason) => Err(PipelineError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        }),
    }
}
