//! Lightweight pre-check that a site can be crawled

use crate::config::CrawlerConfig;
use crate::crawlers::fetcher::{Fetcher, fetch_html};
use crate::crawlers::ranker::PageRanker;
use crate::filter::UrlFilter;
use crate::normalizer::{normalize_seed, seed_url};
use crate::parsers::Parser;
use crate::results::ScrapabilityReport;
use crate::robots::RobotsPolicy;

/// Report whether and how much of a site can be crawled
///
/// Runs seed normalization, a reachability check, an anchor check, the
/// optional robots.txt check and then the ranking phase alone. Every failure
/// becomes a `can_scrape: false` report.
pub async fn check_site<F: Fetcher + ?Sized>(
    fetcher: &F,
    filter: &UrlFilter,
    config: &CrawlerConfig,
    raw_seed: &str,
) -> ScrapabilityReport {
    let seed = match normalize_seed(raw_seed, fetcher, config.probe_timeout())
        .await
        .and_then(|seed| seed_url(&seed))
    {
        Ok(seed) => seed,
        Err(e) => return ScrapabilityReport::rejected(format!("Invalid URL: {}", e)),
    };

    let document = match fetch_html(fetcher, &seed, config.rank_timeout()).await {
        Ok(document) => document,
        Err(e) => {
            ::log::warn!("Scrapability probe could not reach {}: {}", seed, e);
            return ScrapabilityReport::rejected(format!("Website is not accessible: {}", e));
        }
    };

    if Parser::parse_links(&document.body).links.is_empty() {
        return ScrapabilityReport::rejected("No links found on the page");
    }

    let robots = if config.respect_robots {
        let policy =
            RobotsPolicy::fetch(fetcher, &seed, &config.user_agent, config.probe_timeout()).await;
        if !policy.is_allowed(&seed) {
            return ScrapabilityReport::rejected("Crawling is disallowed by robots.txt");
        }
        Some(policy)
    } else {
        None
    };

    let filter = filter.clone().with_robots(robots);
    let ranked = PageRanker::new(fetcher, &filter, config)
        .rank(&seed, config.max_pages)
        .await;

    ::log::info!("Scrapability probe found {} pages for {}", ranked.len(), seed);
    ScrapabilityReport::scrapable(ranked.len())
}
