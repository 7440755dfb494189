use serde::Deserialize;

/// Main configuration structure for Rozee-Jobs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub request: RequestConfig,
    pub proxy: Option<ProxyConfig>,
    pub output: OutputConfig,
}

/// What to harvest and how much of it
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// Search keyword; empty means unrestricted
    pub keyword: String,

    /// Target number of persisted records
    pub results_wanted: u32,

    /// Highest search-result page that may be requested
    pub max_pages: u32,

    /// Single explicit seed URL, bypassing keyword search
    #[serde(alias = "url")]
    pub start_url: Option<String>,

    /// Explicit seed URLs, bypassing keyword search
    pub start_urls: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            results_wanted: 100,
            max_pages: 50,
            start_url: None,
            start_urls: Vec::new(),
        }
    }
}

impl SearchConfig {
    /// Explicit seeds in precedence order: `start-urls`, then `start-url`
    pub fn explicit_seeds(&self) -> Vec<String> {
        let listed: Vec<String> = self
            .start_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();

        if !listed.is_empty() {
            return listed;
        }

        self.start_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(|u| vec![u.to_string()])
            .unwrap_or_default()
    }
}

/// Target site identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host that search URLs are built on
    pub base_url: String,

    /// Value written to every record's `source` field
    pub source: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.rozee.pk".to_string(),
            source: "rozee.pk".to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Worker pool size at start and lower bound after backing off
    pub min_concurrency: u32,

    /// Upper bound for the worker pool
    pub max_concurrency: u32,

    /// Retries after the first attempt of a task
    pub max_request_retries: u32,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Base delay before a retry, doubled on every further attempt (milliseconds)
    pub retry_backoff_ms: u64,

    /// Delay before every fetch (milliseconds)
    pub pacing_delay_ms: u64,

    /// New detail tasks a list page must yield for pagination to continue
    pub min_new_details_to_paginate: u32,

    /// Case-insensitive phrases marking an anti-automation page
    pub block_phrases: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            min_concurrency: 3,
            max_concurrency: 10,
            max_request_retries: 3,
            request_timeout_secs: 30,
            retry_backoff_ms: 1000,
            pacing_delay_ms: 0,
            min_new_details_to_paginate: 1,
            block_phrases: vec![
                "forbidden".to_string(),
                "access denied".to_string(),
                "blocked".to_string(),
            ],
        }
    }
}

/// Request shaping
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RequestConfig {
    /// Pool the user agent of each request is drawn from
    pub user_agents: Vec<String>,

    /// `Accept` header value
    pub accept: String,

    /// `Accept-Language` header value
    pub accept_language: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Outbound proxy credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Dataset format written by the result sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line
    #[default]
    Jsonl,
    /// One row per record in a SQLite `jobs` table
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Path of the dataset file
    pub path: String,

    /// Records per persisted batch
    pub batch_size: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jsonl,
            path: "./jobs.jsonl".to_string(),
            batch_size: 10,
        }
    }
}
