//! Machine translation of article summaries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::PipelineError;
use crate::retry::retry_with_backoff;
use crate::search::normalize_base_url;

/// Translates text between two language codes (`"en"`, `"hi"`, ...).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str)
        -> Result<String, PipelineError>;
}

/// Client for the public `translate_a/single` endpoint.
pub struct GoogleTranslateClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GoogleTranslateClient {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidUrl`] for a malformed `base_url` or
    /// [`PipelineError::Http`] if the `reqwest::Client` cannot be built.
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
            endpoint: format!("{base_url}/translate_a/single"),
            max_retries,
            backoff_base_ms,
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, PipelineError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("client", "gtx"),
                    ("sl", source),
                    ("tl", target),
                    ("dt", "t"),
                    ("q", text),
                ])
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(PipelineError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: self.endpoint.clone(),
                });
            }
            Ok(response.json::<Value>().await?)
        })
        .await?;

        parse_translation(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
///
/// The payload is a nested array whose first element lists sentence segments
/// as `[translated, original, ...]`.
pub(crate) fn parse_translation(body: &Value) -> Result<String, PipelineError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Translation("response has no segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(PipelineError::Translation(
            "response contained no translated text".to_string(),
        ));
    }
    Ok(translated)
}
