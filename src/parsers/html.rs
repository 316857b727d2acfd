use crate::parsers::text::collapse_whitespace;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Elements whose text never counts as page content
const NON_CONTENT_ELEMENTS: [&str; 5] = ["script", "style", "iframe", "noscript", "svg"];

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid body selector"));
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Extracts the visible text of `<body>`
///
/// Text inside non-content elements is skipped and comments are never text
/// nodes, so both are dropped. Whitespace is collapsed to single spaces.
pub fn extract_text(doc: &Html) -> String {
    let mut raw = String::new();

    for body in doc.select(&BODY_SELECTOR) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| NON_CONTENT_ELEMENTS.contains(&element.name()))
            });
            if hidden {
                continue;
            }
            raw.push_str(text);
            raw.push(' ');
        }
    }

    collapse_whitespace(&raw)
}

/// Extracts the `href` of every anchor, in document order
pub fn extract_links(doc: &Html) -> Vec<String> {
    let links = doc
        .select(&LINK_SELECTOR)
        .filter_map(|e| e.value().attr("href"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<String>>();

    ::log::debug!("HTML parser found {} links", links.len());
    links
}
