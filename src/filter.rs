use crate::robots::RobotsPolicy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{Origin, Url};

/// Paths ending in one of these extensions are never pages
pub const NON_PAGE_EXTENSIONS: &str = r"(?i)\.(pdf|jpg|jpeg|png|gif|svg|css|js)$";

/// Configuration for URL filtering in crawlers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Regex patterns for URLs to include (if empty, all URLs are included unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Decides which discovered links a crawl may follow
///
/// A link must share the origin of the page it was found on, must not point
/// at a non-page resource, and must pass the configured patterns and, when
/// attached, the robots.txt policy.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    extension_regex: Regex,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
    robots: Option<RobotsPolicy>,
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new(UrlFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl UrlFilter {
    /// Create a new URL filter from configuration
    pub fn new(config: UrlFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            extension_regex: Regex::new(NON_PAGE_EXTENSIONS)?,
            include_regexes,
            exclude_regexes,
            robots: None,
        })
    }

    /// Attach a robots.txt policy; disallowed paths are rejected from then on
    pub fn with_robots(mut self, robots: Option<RobotsPolicy>) -> Self {
        self.robots = robots;
        self
    }

    /// Determine if a URL should be crawled when found on a page served from `origin`
    pub fn should_crawl(&self, url: &Url, origin: &Origin) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if url.origin() != *origin {
            return false;
        }

        if self.extension_regex.is_match(url.path()) {
            return false;
        }

        if let Some(robots) = &self.robots {
            if !robots.is_allowed(url) {
                ::log::debug!("robots.txt disallows {}", url);
                return false;
            }
        }

        // Check regex exclusions (these take precedence)
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|regex| regex.is_match(url_str)) {
            return false;
        }

        // If include patterns are specified, at least one must match
        self.include_regexes.is_empty()
            || self.include_regexes.iter().any(|regex| regex.is_match(url_str))
    }

    /// Resolve raw `href`s against the page origin and keep the crawlable ones
    ///
    /// Results are normalized and deduplicated, in first-seen order.
    pub fn filter_links(&self, hrefs: &[String], page_url: &Url) -> Vec<Url> {
        let origin = page_url.origin();
        let Ok(base) = Url::parse(&origin.ascii_serialization()) else {
            return Vec::new();
        };

        let mut accepted: Vec<Url> = Vec::new();
        for href in hrefs {
            let Ok(resolved) = base.join(href) else {
                ::log::trace!("Unresolvable link {} on {}", href, page_url);
                continue;
            };
            let normalized = normalize_url(&resolved);
            if !self.should_crawl(&normalized, &origin) {
                ::log::trace!("URL filter rejected: {}", normalized);
                continue;
            }
            if !accepted.contains(&normalized) {
                accepted.push(normalized);
            }
        }
        accepted
    }
}

/// Strip the fragment and the query string
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.set_query(None);
    normalized
}
