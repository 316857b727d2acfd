use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A fetched page, handed to the caller for review and persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// Normalized absolute URL (no fragment, no query)
    pub url: String,

    /// Set by a human reviewer; always false when produced by a crawl
    pub selected: bool,

    /// Cleaned, truncated text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ScrapedPage {
    /// Create an unselected page record
    pub fn new(url: String, content: Option<String>) -> Self {
        Self {
            url,
            selected: false,
            content,
        }
    }
}

/// Outcome of the scrapability probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapabilityReport {
    pub can_scrape: bool,
    pub pages_count: usize,
    pub message: String,
}

impl ScrapabilityReport {
    pub fn scrapable(pages_count: usize) -> Self {
        Self {
            can_scrape: pages_count > 0,
            pages_count,
            message: if pages_count > 0 {
                format!("Found {} scrapable pages", pages_count)
            } else {
                "No scrapable pages found".to_string()
            },
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            can_scrape: false,
            pages_count: 0,
            message: message.into(),
        }
    }
}

/// Accumulates page records in fetch order, one per URL, up to a cap
#[derive(Debug)]
pub struct PageCollector {
    pages: Vec<ScrapedPage>,
    seen: HashSet<String>,
    cap: usize,
}

impl PageCollector {
    pub fn new(cap: usize) -> Self {
        Self {
            pages: Vec::new(),
            seen: HashSet::new(),
            cap,
        }
    }

    /// Add a page; returns false if the URL was already collected or the cap is reached
    pub fn push(&mut self, page: ScrapedPage) -> bool {
        if self.is_full() || self.seen.contains(&page.url) {
            ::log::debug!("Dropping page record for {}", page.url);
            return false;
        }
        self.seen.insert(page.url.clone());
        self.pages.push(page);
        true
    }

    pub fn is_full(&self) -> bool {
        self.pages.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn into_pages(self) -> Vec<ScrapedPage> {
        self.pages
    }
}

/// Mark exactly the listed URLs as selected
pub fn apply_selection(pages: &mut [ScrapedPage], selected_urls: &[String]) {
    let selected: HashSet<&str> = selected_urls.iter().map(String::as_str).collect();
    for page in pages.iter_mut() {
        page.selected = selected.contains(page.url.as_str());
    }
}

/// Non-empty content of the selected pages, in list order
pub fn selected_content(pages: &[ScrapedPage]) -> Vec<&str> {
    pages
        .iter()
        .filter(|page| page.selected)
        .filter_map(|page| page.content.as_deref())
        .filter(|content| !content.is_empty())
        .collect()
}

/// Render the selected pages as one block of reference text
pub fn training_context(pages: &[ScrapedPage]) -> String {
    pages
        .iter()
        .filter(|page| page.selected)
        .map(|page| {
            format!(
                "Content from {}:\n{}",
                page.url,
                page.content.as_deref().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
