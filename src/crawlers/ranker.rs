use crate::config::CrawlerConfig;
use crate::crawlers::context::{CrawlContext, PageInfo};
use crate::crawlers::fetcher::{Fetcher, fetch_html};
use crate::crawlers::scheduler::ChunkScheduler;
use crate::error::FetchError;
use crate::filter::UrlFilter;
use crate::parsers::Parser;
use std::collections::VecDeque;
use std::time::Duration;
use url::Url;

/// Inbound links beyond this count add nothing to the score
const LINK_COUNT_CAP: usize = 10;
const TOP_LEVEL_BONUS: f64 = 0.5;

/// A discovered URL with its importance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPage {
    pub url: Url,
    pub score: f64,
}

/// Importance of a page: popularity + proximity to the seed + top-level bonus
pub fn score(page: &PageInfo, max_depth: usize) -> f64 {
    let link_score = page.link_count.min(LINK_COUNT_CAP) as f64 / LINK_COUNT_CAP as f64;
    let depth_score = if max_depth == 0 {
        0.0
    } else {
        max_depth.saturating_sub(page.depth) as f64 / max_depth as f64
    };
    let top_level_bonus = if page.is_top_level {
        TOP_LEVEL_BONUS
    } else {
        0.0
    };
    link_score + depth_score + top_level_bonus
}

/// Score every page and keep the best `max_pages`; ties keep discovery order
pub fn rank_pages(pages: Vec<PageInfo>, max_depth: usize, max_pages: usize) -> Vec<ScoredPage> {
    let mut scored = pages
        .into_iter()
        .map(|page| ScoredPage {
            score: score(&page, max_depth),
            url: page.url,
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(max_pages);
    scored
}

/// Bounded breadth-first exploration that ranks the pages of a site
pub struct PageRanker<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    filter: &'a UrlFilter,
    scheduler: ChunkScheduler,
    max_depth: usize,
    budget: usize,
    timeout: Duration,
}

impl<'a, F: Fetcher + ?Sized> PageRanker<'a, F> {
    pub fn new(fetcher: &'a F, filter: &'a UrlFilter, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            filter,
            scheduler: ChunkScheduler::new(config.concurrency, config.chunk_delay()),
            max_depth: config.max_depth,
            budget: config.explore_budget(),
            timeout: config.rank_timeout(),
        }
    }

    /// The `max_pages` most important URLs, best first
    pub async fn rank(&self, seed: &Url, max_pages: usize) -> Vec<ScoredPage> {
        let pages = self.explore(seed).await;
        let discovered = pages.len();
        let ranked = rank_pages(pages, self.max_depth, max_pages);
        ::log::info!(
            "Ranked {} of {} discovered pages for {}",
            ranked.len(),
            discovered,
            seed
        );
        ranked
    }

    /// Explore outward from the seed, layer by layer, within depth and fetch budget
    ///
    /// Returns every discovered page, the seed included, in discovery order.
    pub async fn explore(&self, seed: &Url) -> Vec<PageInfo> {
        let mut ctx = CrawlContext::new();
        ctx.record_link(seed, 0);

        let mut frontier: VecDeque<(Url, usize)> = VecDeque::from([(seed.clone(), 0)]);
        let mut layers = 0;

        while !frontier.is_empty() && ctx.visited_count() < self.budget {
            let layer = self.next_layer(&mut frontier, &mut ctx);
            if layer.is_empty() {
                continue;
            }
            if layers > 0 {
                self.scheduler.pause().await;
            }
            layers += 1;

            let results = self
                .scheduler
                .run(layer, |(url, depth)| async move {
                    let links = self.collect_links(&url).await;
                    (url, depth, links)
                })
                .await;

            for (url, depth, links) in results {
                let links = match links {
                    Ok(links) => links,
                    Err(e) => {
                        ::log::warn!("Ranking could not expand {}: {}", url, e);
                        continue;
                    }
                };
                ::log::debug!("{} links to {} pages", url, links.len());

                let child_depth = depth + 1;
                for link in links {
                    if ctx.record_link(&link, child_depth)
                        && child_depth < self.max_depth
                        && !ctx.is_visited(&link)
                    {
                        frontier.push_back((link, child_depth));
                    }
                }
            }
        }

        ::log::debug!(
            "Exploration of {} stopped after {} fetches",
            seed,
            ctx.visited_count()
        );
        ctx.into_pages()
    }

    /// Pull the next same-depth batch off the frontier, marking it visited
    fn next_layer(
        &self,
        frontier: &mut VecDeque<(Url, usize)>,
        ctx: &mut CrawlContext,
    ) -> Vec<(Url, usize)> {
        let mut layer = Vec::new();
        let Some(layer_depth) = frontier.front().map(|(_, depth)| *depth) else {
            return layer;
        };

        while ctx.visited_count() < self.budget {
            match frontier.front() {
                Some((_, depth)) if *depth == layer_depth => {}
                _ => break,
            }
            let Some((url, depth)) = frontier.pop_front() else {
                break;
            };
            if depth >= self.max_depth || !ctx.mark_visited(&url) {
                continue;
            }
            layer.push((url, depth));
        }
        layer
    }

    /// Fetch a page and return its crawlable links
    async fn collect_links(&self, url: &Url) -> Result<Vec<Url>, FetchError> {
        let document = fetch_html(self.fetcher, url, self.timeout).await?;
        let parsed = Parser::parse_links(&document.body);
        Ok(self.filter.filter_links(&parsed.links, &document.final_url))
    }
}
