use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; YourBot/1.0)";

/// Which pages the content phase is allowed to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchScope {
    /// Fetch only the ranked selection
    RankedOnly,
    /// Fetch the ranked selection first, then let same-origin links found
    /// while fetching fill the rest of the page cap
    #[default]
    RankedAndDiscovered,
}

impl FetchScope {
    /// Whether links found during the content phase may be followed
    pub fn follows_links(&self) -> bool {
        matches!(self, FetchScope::RankedAndDiscovered)
    }
}

/// Configuration for a site crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Page cap for the ranked selection and the content phase
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum BFS depth while ranking
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of URLs fetched while ranking (defaults to twice the page cap)
    #[serde(default)]
    pub explore_budget: Option<usize>,

    /// Number of fetches dispatched together in one chunk
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause between chunks, in milliseconds
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// Timeout of the HTTPS upgrade probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Per-fetch timeout while ranking
    #[serde(default = "default_rank_timeout_secs")]
    pub rank_timeout_secs: u64,

    /// Per-fetch timeout while fetching content
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Extracted text is truncated to this many characters
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Same-origin links followed from each fetched page
    #[serde(default = "default_links_per_page")]
    pub links_per_page: usize,

    #[serde(default)]
    pub fetch_scope: FetchScope,

    /// Enforce robots.txt rules for the seed origin
    #[serde(default)]
    pub respect_robots: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Regex patterns for URLs to include
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_max_pages() -> usize {
    20
}

fn default_max_depth() -> usize {
    2
}

fn default_concurrency() -> usize {
    3
}

fn default_chunk_delay_ms() -> u64 {
    500
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_rank_timeout_secs() -> u64 {
    8
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_content_chars() -> usize {
    50_000
}

fn default_links_per_page() -> usize {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            explore_budget: None,
            concurrency: default_concurrency(),
            chunk_delay_ms: default_chunk_delay_ms(),
            probe_timeout_secs: default_probe_timeout_secs(),
            rank_timeout_secs: default_rank_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_content_chars: default_max_content_chars(),
            links_per_page: default_links_per_page(),
            fetch_scope: FetchScope::default(),
            respect_robots: false,
            user_agent: default_user_agent(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl CrawlerConfig {
    /// Create a configuration with default values and the given page cap
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScrapeError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScrapeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the crawl cannot run with
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.max_depth == 0 {
            return Err(ScrapeError::Config("max_depth must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(ScrapeError::Config("concurrency must be at least 1".into()));
        }
        Ok(())
    }

    /// URLs the ranking phase may fetch
    pub fn explore_budget(&self) -> usize {
        self.explore_budget
            .unwrap_or_else(|| self.max_pages.saturating_mul(2))
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn rank_timeout(&self) -> Duration {
        Duration::from_secs(self.rank_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.explore_budget(), 40);
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.chunk_delay(), Duration::from_millis(500));
        assert_eq!(config.max_content_chars, 50_000);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.fetch_scope, FetchScope::RankedAndDiscovered);
        assert!(!config.respect_robots);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config =
            CrawlerConfig::from_json(r#"{"max_pages": 5, "fetch_scope": "ranked_only"}"#).unwrap();
        assert_eq!(config.max_pages, 5);
        assert_eq!(config.explore_budget(), 10);
        assert_eq!(config.fetch_scope, FetchScope::RankedOnly);
        assert_eq!(config.rank_timeout(), Duration::from_secs(8));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_budget_wins() {
        let config = CrawlerConfig::from_json(r#"{"explore_budget": 7}"#).unwrap();
        assert_eq!(config.explore_budget(), 7);
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let result = CrawlerConfig::from_json(r#"{"max_depth": 0}"#);
        assert!(matches!(result, Err(ScrapeError::Config(_))));

        let config = CrawlerConfig {
            concurrency: 0,
            ..CrawlerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
