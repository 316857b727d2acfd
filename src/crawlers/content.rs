use crate::config::CrawlerConfig;
use crate::crawlers::context::CrawlContext;
use crate::crawlers::fetcher::{Fetcher, fetch_html};
use crate::crawlers::scheduler::ChunkScheduler;
use crate::error::FetchError;
use crate::filter::UrlFilter;
use crate::parsers::Parser;
use crate::results::{PageCollector, ScrapedPage};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Text and outgoing links of one fetched page
#[derive(Debug)]
struct FetchedPage {
    content: String,
    links: Vec<Url>,
}

/// Fetches and cleans page text for a list of target URLs
///
/// Targets are fetched first, in the order given. When link following is on,
/// same-origin links found along the way are queued behind them and fetched
/// while the page cap allows. Every fetch attempt counts toward the cap.
pub struct ContentFetcher<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    filter: &'a UrlFilter,
    scheduler: ChunkScheduler,
    max_pages: usize,
    max_content_chars: usize,
    links_per_page: usize,
    follow_links: bool,
    timeout: Duration,
}

impl<'a, F: Fetcher + ?Sized> ContentFetcher<'a, F> {
    pub fn new(fetcher: &'a F, filter: &'a UrlFilter, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            filter,
            scheduler: ChunkScheduler::new(config.concurrency, config.chunk_delay()),
            max_pages: config.max_pages,
            max_content_chars: config.max_content_chars,
            links_per_page: config.links_per_page,
            follow_links: config.fetch_scope.follows_links(),
            timeout: config.fetch_timeout(),
        }
    }

    /// Override whether discovered links are followed
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Fetch the targets (and, if enabled, their neighbors) up to the page cap
    pub async fn fetch_all(&self, targets: Vec<Url>) -> Vec<ScrapedPage> {
        let mut ctx = CrawlContext::new();
        let mut collector = PageCollector::new(self.max_pages);
        let mut queued: HashSet<Url> = targets.iter().cloned().collect();
        let mut frontier: VecDeque<Url> = targets.into();
        let mut rounds = 0;

        loop {
            let mut batch = Vec::new();
            while ctx.visited_count() < self.max_pages {
                let Some(url) = frontier.pop_front() else {
                    break;
                };
                if ctx.mark_visited(&url) {
                    batch.push(url);
                }
            }
            if batch.is_empty() {
                break;
            }
            if rounds > 0 {
                self.scheduler.pause().await;
            }
            rounds += 1;

            let results = self
                .scheduler
                .run(batch, |url| async move {
                    let page = self.fetch_page(&url).await;
                    (url, page)
                })
                .await;

            for (url, page) in results {
                let page = match page {
                    Ok(page) => page,
                    Err(e) => {
                        ::log::warn!("Skipping {}: {}", url, e);
                        continue;
                    }
                };
                ::log::info!("Fetched {} ({} chars)", url, page.content.chars().count());

                // Links already queued or fetched don't use up the per-page budget
                if self.follow_links {
                    frontier.extend(
                        page.links
                            .into_iter()
                            .filter(|link| queued.insert(link.clone()))
                            .take(self.links_per_page),
                    );
                }
                collector.push(ScrapedPage::new(url.to_string(), Some(page.content)));
            }
        }

        ::log::info!(
            "Content phase fetched {} pages from {} attempts",
            collector.len(),
            ctx.visited_count()
        );
        collector.into_pages()
    }

    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let document = fetch_html(self.fetcher, url, self.timeout).await?;
        let parsed = Parser::parse_page(&document.body, self.max_content_chars);
        let links = self.filter.filter_links(&parsed.links, &document.final_url);

        Ok(FetchedPage {
            content: parsed.content,
            links,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchScope;
    use crate::crawlers::testing::StaticFetcher;
    use std::collections::HashSet;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn page_with(text: &str, hrefs: &[&str]) -> String {
        let anchors = hrefs
            .iter()
            .map(|href| format!(r#"<a href="{}">link</a>"#, href))
            .collect::<String>();
        format!(
            "<html><body><script>ignored()</script><p>{}</p>{}</body></html>",
            text, anchors
        )
    }

    fn test_config(max_pages: usize) -> CrawlerConfig {
        CrawlerConfig {
            max_pages,
            chunk_delay_ms: 0,
            ..CrawlerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetches_targets_in_order() {
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &[]))
            .page("https://example.com/about", &page_with("About", &[]))
            .page("https://example.com/blog", &page_with("Blog", &[]));
        let filter = UrlFilter::default();
        let config = test_config(20);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content
            .fetch_all(vec![
                url("https://example.com/"),
                url("https://example.com/about"),
                url("https://example.com/blog"),
            ])
            .await;

        let summary = pages
            .iter()
            .map(|p| (p.url.as_str(), p.content.as_deref().unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("https://example.com/", "Home"),
                ("https://example.com/about", "About"),
                ("https://example.com/blog", "Blog"),
            ]
        );
        assert!(pages.iter().all(|p| !p.selected));
    }

    #[tokio::test]
    async fn test_discovery_fills_remaining_cap() {
        let fetcher = StaticFetcher::new()
            .page(
                "https://example.com/",
                &page_with("Home", &["/a", "/b", "/c", "/d", "/e", "/f", "/g"]),
            )
            .page("https://example.com/a", &page_with("A", &["/", "/a/1"]))
            .page("https://example.com/b", &page_with("B", &[]))
            .page("https://example.com/c", &page_with("C", &[]))
            .page("https://example.com/d", &page_with("D", &[]))
            .page("https://example.com/e", &page_with("E", &[]))
            .page("https://example.com/a/1", &page_with("A1", &[]));
        let filter = UrlFilter::default();
        let config = test_config(4);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content.fetch_all(vec![url("https://example.com/")]).await;
        let paths = pages
            .iter()
            .map(|p| url(&p.url).path().to_string())
            .collect::<Vec<_>>();
        // Five links per page at most, and the cap stops at four pages
        assert_eq!(paths, vec!["/", "/a", "/b", "/c"]);
        assert_eq!(fetcher.request_count("https://example.com/f"), 0);
    }

    #[tokio::test]
    async fn test_queued_links_leave_room_for_new_ones() {
        let shared = ["/a", "/b", "/c", "/d", "/e"];
        let mut second = shared.to_vec();
        second.push("/f");
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &shared))
            .page("https://example.com/x", &page_with("X", &second))
            .page("https://example.com/a", &page_with("A", &[]))
            .page("https://example.com/b", &page_with("B", &[]))
            .page("https://example.com/c", &page_with("C", &[]))
            .page("https://example.com/d", &page_with("D", &[]))
            .page("https://example.com/e", &page_with("E", &[]))
            .page("https://example.com/f", &page_with("F", &[]));
        let filter = UrlFilter::default();
        let config = test_config(20);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content
            .fetch_all(vec![url("https://example.com/"), url("https://example.com/x")])
            .await;
        let paths = pages
            .iter()
            .map(|p| url(&p.url).path().to_string())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["/", "/x", "/a", "/b", "/c", "/d", "/e", "/f"]);
        assert_eq!(fetcher.request_count("https://example.com/a"), 1);
        assert_eq!(fetcher.request_count("https://example.com/f"), 1);
    }

    #[tokio::test]
    async fn test_ranked_only_never_follows_links() {
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &["/hidden"]))
            .page("https://example.com/hidden", &page_with("Hidden", &[]));
        let filter = UrlFilter::default();
        let config = CrawlerConfig {
            fetch_scope: FetchScope::RankedOnly,
            ..test_config(20)
        };
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content.fetch_all(vec![url("https://example.com/")]).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(fetcher.request_count("https://example.com/hidden"), 0);
    }

    #[tokio::test]
    async fn test_ranked_targets_come_before_discovered_links() {
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &["/new"]))
            .page("https://example.com/about", &page_with("About", &[]))
            .page("https://example.com/new", &page_with("New", &[]));
        let filter = UrlFilter::default();
        let config = test_config(2);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content
            .fetch_all(vec![url("https://example.com/"), url("https://example.com/about")])
            .await;
        let urls = pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>();
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/about"]);
    }

    #[tokio::test]
    async fn test_failures_are_skipped_and_never_retried() {
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &["/down", "/pdf", "/ok"]))
            .status("https://example.com/down", 503)
            .document("https://example.com/pdf", "application/pdf", "%PDF-1.7")
            .page("https://example.com/ok", &page_with("OK", &["/down"]));
        let filter = UrlFilter::default();
        let config = test_config(20);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content.fetch_all(vec![url("https://example.com/")]).await;
        let urls = pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>();
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/ok"]);
        assert_eq!(fetcher.request_count("https://example.com/down"), 1);
    }

    #[tokio::test]
    async fn test_no_duplicates_when_pages_cross_link() {
        let fetcher = StaticFetcher::new()
            .page("https://example.com/", &page_with("Home", &["/a", "/b"]))
            .page("https://example.com/a", &page_with("A", &["/", "/b", "/a?x=1#top"]))
            .page("https://example.com/b", &page_with("B", &["/", "/a"]));
        let filter = UrlFilter::default();
        let config = test_config(20);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content
            .fetch_all(vec![url("https://example.com/"), url("https://example.com/a")])
            .await;
        let unique = pages.iter().map(|p| p.url.as_str()).collect::<HashSet<_>>();
        assert_eq!(pages.len(), 3);
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test]
    async fn test_redirected_page_follows_actual_origin() {
        let fetcher = StaticFetcher::new()
            .redirect(
                "https://example.com/",
                "https://www.example.com/",
                &page_with("Home", &["/team", "https://example.com/legacy"]),
            )
            .page("https://www.example.com/team", &page_with("Team", &[]))
            .page("https://example.com/legacy", &page_with("Legacy", &[]));
        let filter = UrlFilter::default();
        let config = test_config(20);
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content.fetch_all(vec![url("https://example.com/")]).await;
        let urls = pages.iter().map(|p| p.url.as_str()).collect::<Vec<_>>();
        assert_eq!(urls, vec!["https://example.com/", "https://www.example.com/team"]);
    }

    #[tokio::test]
    async fn test_content_is_capped() {
        let long_text = "word ".repeat(1_000);
        let fetcher =
            StaticFetcher::new().page("https://example.com/", &page_with(&long_text, &[]));
        let filter = UrlFilter::default();
        let config = CrawlerConfig {
            max_content_chars: 120,
            ..test_config(20)
        };
        let content = ContentFetcher::new(&fetcher, &filter, &config);

        let pages = content.fetch_all(vec![url("https://example.com/")]).await;
        assert_eq!(pages[0].content.as_ref().unwrap().chars().count(), 120);
    }
}
