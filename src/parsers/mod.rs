pub mod html;
pub mod text;


/// Result of parsing a fetched document
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Cleaned text content
    pub content: String,
    /// Raw `href` values of the anchors, in document order
    pub links: Vec<String>,
}

impl ParseResult {
    /// Creates a new parse result with the given content and links
    pub fn new(content: String, links: Vec<String>) -> Self {
        Self { content, links }
    }

    /// Creates a new parse result with links only (no text)
    pub fn links_only(links: Vec<String>) -> Self {
        Self {
            content: String::new(),
            links,
        }
    }
}

/// Main parser for fetched pages
pub struct Parser;

impl Parser {
    /// Extract cleaned text, capped at `max_chars` characters, and anchors
    pub fn parse_page(html: &str, max_chars: usize) -> ParseResult {
        let doc = scraper::Html::parse_document(html);
        let content = text::truncate_chars(&html::extract_text(&doc), max_chars);
        ParseResult::new(content, html::extract_links(&doc))
    }

    /// Extract anchors only; the ranking phase never needs page text
    pub fn parse_links(html: &str) -> ParseResult {
        let doc = scraper::Html::parse_document(html);
        ParseResult::links_only(html::extract_links(&doc))
    }
}
