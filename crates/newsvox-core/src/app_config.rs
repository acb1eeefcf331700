use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Origin of the news search page; `/search?p=<company>` is appended.
    pub search_base_url: String,
    pub translate_base_url: String,
    pub tts_base_url: String,
    pub user_agent: String,
    pub source_language: String,
    pub target_language: String,
    pub max_items: usize,
    /// Number of items classified/translated at once. `1` is fully sequential.
    pub item_concurrency: usize,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Directory the server writes per-request narration files into.
    pub audio_dir: PathBuf,
    /// Newest narration files kept in `audio_dir`; older ones are pruned.
    pub audio_retain_files: usize,
    /// Default narration output path for the CLI.
    pub audio_file: PathBuf,
    pub rate_limit_per_minute: usize,
}
