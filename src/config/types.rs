use serde::Deserialize;

/// Main configuration structure for Repo-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First page of the repository listing
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Minimum time between the start of two requests (milliseconds)
    #[serde(rename = "download-delay")]
    pub download_delay: u64,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Overall wall-clock limit for a crawl (seconds)
    #[serde(default)]
    pub deadline: Option<u64>,
}

/// Request identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// User-Agent header sent with every request
    pub identity: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the XML file that receives finished items
    #[serde(rename = "items-path")]
    pub items_path: String,
}

/// Everything the HTTP fetcher needs, threaded in at construction
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub identity: String,
    pub download_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Extracts the fetcher settings from the crawl configuration
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            identity: self.user_agent.identity.clone(),
            download_delay_ms: self.crawler.download_delay,
            request_timeout_secs: self.crawler.request_timeout,
        }
    }
}
