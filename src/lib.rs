//! Site crawler that ranks a website's pages by importance and fetches the
//! cleaned text of the most important ones.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod normalizer;
pub mod parsers;
pub mod probe;
pub mod results;
pub mod robots;

// Re-export commonly used types for convenience
pub use config::{CrawlerConfig, FetchScope};
pub use crawlers::{Fetcher, HttpFetcher, ScoredPage};
pub use error::{FetchError, ScrapeError};
pub use results::{ScrapabilityReport, ScrapedPage};

use crawlers::{ContentFetcher, PageRanker};
use filter::{UrlFilter, UrlFilterConfig};
use robots::RobotsPolicy;
use std::path::Path;
use url::Url;

/// Entry point for crawls of one configuration
///
/// Each call builds its own crawl state, so one `Scraper` can serve
/// concurrent crawls of different sites.
pub struct Scraper<F: Fetcher = HttpFetcher> {
    config: CrawlerConfig,
    filter: UrlFilter,
    fetcher: F,
}

impl Scraper<HttpFetcher> {
    /// Create a scraper that fetches over HTTP
    pub fn new(config: CrawlerConfig) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        Self::new(CrawlerConfig::from_file(path)?)
    }
}

impl<F: Fetcher> Scraper<F> {
    /// Create a scraper with a custom fetch collaborator
    pub fn with_fetcher(config: CrawlerConfig, fetcher: F) -> Result<Self, ScrapeError> {
        config.validate()?;
        let filter = UrlFilter::new(UrlFilterConfig {
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        })?;

        Ok(Self {
            config,
            filter,
            fetcher,
        })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Normalize a raw seed address, probing for HTTPS
    pub async fn normalize(&self, raw_seed: &str) -> Result<String, ScrapeError> {
        normalizer::normalize_seed(raw_seed, &self.fetcher, self.config.probe_timeout()).await
    }

    /// Rank the site's pages without fetching their content
    pub async fn rank(&self, raw_seed: &str) -> Result<Vec<ScoredPage>, ScrapeError> {
        let seed = self.seed(raw_seed).await?;
        let Some(filter) = self.crawl_filter(&seed).await else {
            return Ok(Vec::new());
        };
        Ok(PageRanker::new(&self.fetcher, &filter, &self.config)
            .rank(&seed, self.config.max_pages)
            .await)
    }

    /// Rank the site, then fetch the text of the top pages
    ///
    /// Only a malformed seed is an error; unreachable pages are logged and
    /// left out of the result.
    pub async fn scrape(&self, raw_seed: &str) -> Result<Vec<ScrapedPage>, ScrapeError> {
        let seed = self.seed(raw_seed).await?;
        ::log::info!("Starting crawl of {} (max {} pages)", seed, self.config.max_pages);

        let Some(filter) = self.crawl_filter(&seed).await else {
            return Ok(Vec::new());
        };

        let ranked = PageRanker::new(&self.fetcher, &filter, &self.config)
            .rank(&seed, self.config.max_pages)
            .await;
        let targets = ranked.into_iter().map(|page| page.url).collect();

        let pages = ContentFetcher::new(&self.fetcher, &filter, &self.config)
            .fetch_all(targets)
            .await;
        ::log::info!("Crawl of {} returned {} pages", seed, pages.len());
        Ok(pages)
    }

    /// Fetch content starting from the seed alone, following same-origin links
    pub async fn crawl_from_seed(&self, raw_seed: &str) -> Result<Vec<ScrapedPage>, ScrapeError> {
        let seed = self.seed(raw_seed).await?;
        let Some(filter) = self.crawl_filter(&seed).await else {
            return Ok(Vec::new());
        };

        Ok(ContentFetcher::new(&self.fetcher, &filter, &self.config)
            .with_follow_links(true)
            .fetch_all(vec![seed])
            .await)
    }

    /// Check whether the site can be crawled, never failing
    pub async fn check(&self, raw_seed: &str) -> ScrapabilityReport {
        probe::check_site(&self.fetcher, &self.filter, &self.config, raw_seed).await
    }

    async fn seed(&self, raw_seed: &str) -> Result<Url, ScrapeError> {
        let normalized = self.normalize(raw_seed).await?;
        normalizer::seed_url(&normalized)
    }

    /// The filter for one crawl; `None` when robots.txt forbids the seed itself
    async fn crawl_filter(&self, seed: &Url) -> Option<UrlFilter> {
        if !self.config.respect_robots {
            return Some(self.filter.clone());
        }

        let policy = RobotsPolicy::fetch(
            &self.fetcher,
            seed,
            &self.config.user_agent,
            self.config.probe_timeout(),
        )
        .await;
        if !policy.is_allowed(seed) {
            ::log::warn!("robots.txt disallows crawling {}", seed);
            return None;
        }
        Some(self.filter.clone().with_robots(Some(policy)))
    }
}

/// Crawl a site with default settings and the given page cap
pub async fn scrape_website(
    seed_url: &str,
    max_pages: usize,
) -> Result<Vec<ScrapedPage>, ScrapeError> {
    Scraper::new(CrawlerConfig::new(max_pages))?
        .scrape(seed_url)
        .await
}

/// Probe a site with default settings
pub async fn check_scrapable_pages(seed_url: &str) -> ScrapabilityReport {
    match Scraper::new(CrawlerConfig::default()) {
        Ok(scraper) => scraper.check(seed_url).await,
        Err(e) => ScrapabilityReport::rejected(format!("Scraper unavailable: {}", e)),
    }
}
