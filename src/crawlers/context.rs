use std::collections::{HashMap, HashSet};
use url::Url;

/// What the ranking phase knows about one discovered URL
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub url: Url,
    /// Number of distinct fetched pages seen linking here
    pub link_count: usize,
    /// BFS distance from the seed at first discovery; never updated
    pub depth: usize,
    /// At most one non-empty path segment
    pub is_top_level: bool,
}

impl PageInfo {
    pub fn new(url: Url, depth: usize) -> Self {
        let is_top_level = is_top_level(&url);
        Self {
            url,
            link_count: 1,
            depth,
            is_top_level,
        }
    }
}

/// True when the path has at most one non-empty segment
pub fn is_top_level(url: &Url) -> bool {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count() <= 1)
        .unwrap_or(true)
}

/// State of one crawl invocation: the visited set and the discovered pages
///
/// Owned by a single call and mutated only between scheduler chunks.
#[derive(Debug, Default)]
pub struct CrawlContext {
    visited: HashSet<String>,
    pages: Vec<PageInfo>,
    index: HashMap<String, usize>,
}

impl CrawlContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if self.visited.contains(url.as_str()) {
            ::log::trace!("Skipping already visited: {}", url);
            return false;
        }
        self.visited.insert(url.to_string());
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Records an inbound link found at `depth`
    ///
    /// Returns true when the URL is new. Known URLs only gain a link.
    pub fn record_link(&mut self, url: &Url, depth: usize) -> bool {
        if let Some(&position) = self.index.get(url.as_str()) {
            self.pages[position].link_count += 1;
            return false;
        }
        self.index.insert(url.to_string(), self.pages.len());
        self.pages.push(PageInfo::new(url.clone(), depth));
        true
    }

    #[cfg(test)]
    pub(crate) fn page(&self, url: &Url) -> Option<&PageInfo> {
        self.index.get(url.as_str()).map(|&position| &self.pages[position])
    }

    /// Discovered pages in discovery order
    pub fn into_pages(self) -> Vec<PageInfo> {
        self.pages
    }
}
