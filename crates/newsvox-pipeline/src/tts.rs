//! Speech synthesis of the narration text.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::error::PipelineError;
use crate::retry::retry_with_backoff;
use crate::search::normalize_base_url;

/// Longest text (in characters) sent in a single TTS request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Sentence terminators, including the Devanagari danda.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?;।॥]+$").expect("valid sentence-end regex"));

/// Renders text to MP3 audio bytes in the voice of `language`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, PipelineError>;
}

/// Client for the public `translate_tts` endpoint.
///
/// The endpoint accepts short inputs only, so text is split with
/// [`split_for_speech`] and the returned MP3 segments are concatenated.
pub struct GoogleTtsClient {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GoogleTtsClient {
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
            endpoint: format!("{base_url}/translate_tts"),
            max_retries,
            backoff_base_ms,
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, PipelineError> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let (idx, total, textlen) = (idx.as_str(), total.as_str(), textlen.as_str());
            async move {
                let response = self
                    .client
                    .get(&self.endpoint)
                    .query(&[
                        ("ie", "UTF-8"),
                        ("client", "tw-ob"),
                        ("tl", language),
                        ("q", chunk),
                        ("total", total),
                        ("idx", idx),
                        ("textlen", textlen),
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
                Ok(response.bytes().await?.to_vec())
            }
        })
        .await
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, PipelineError> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        let total = chunks.len();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let bytes = self
                .fetch_chunk(chunk, language, idx, total)
                .await
                .map_err(|e| PipelineError::Synthesis(format!("chunk {idx}/{total}: {e}")))?;
            if bytes.is_empty() {
                return Err(PipelineError::Synthesis(format!(
                    "chunk {idx}/{total}: empty audio response"
                )));
            }
            audio.extend_from_slice(&bytes);
        }

        tracing::debug!(chunks = total, bytes = audio.len(), "synthesized narration");
        Ok(audio)
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Words are packed greedily; a sentence terminator closes the current chunk.
/// A single word longer than `max_chars` is split on character boundaries.
#[must_use]
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            push_chunk(&mut chunks, &mut current, &mut current_len);
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                push_chunk(&mut chunks, &mut current, &mut current_len);
                current = piece.iter().collect();
                current_len = piece.len();
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            push_chunk(&mut chunks, &mut current, &mut current_len);
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;

        if SENTENCE_END.is_match(word) {
            push_chunk(&mut chunks, &mut current, &mut current_len);
        }
    }
    push_chunk(&mut chunks, &mut current, &mut current_len);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, current: &mut String, current_len: &mut usize) {
    if !current.is_empty() {
        chunks.push(std::mem::take(current));
    }
    *current_len = 0;
}

/// Synthesize `text` and write the audio to `path`, creating parent directories.
///
/// Blank text writes an empty file without calling the synthesizer.
///
/// # Errors
///
/// Returns the synthesizer's error, or [`PipelineError::Io`] if the file
/// cannot be written.
pub async fn write_narration_audio(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    language: &str,
    path: &Path,
) -> Result<PathBuf, PipelineError> {
    let audio = if text.trim().is_empty() {
        Vec::new()
    } else {
        synthesizer.synthesize(text, language).await?
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PipelineError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, &audio)
        .await
        .map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(path = %path.display(), bytes = audio.len(), "wrote narration audio");
    Ok(path.to_path_buf())
}
