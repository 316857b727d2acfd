use thiserror::Error;

/// Errors that abort a crawl or prevent one from starting
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The seed address cannot be turned into an absolute http(s) URL
    #[error("invalid seed URL `{url}`: {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An include/exclude pattern failed to compile
    #[error("invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub(crate) fn invalid_seed(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSeedUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Per-page failures. These are logged and the page is skipped; they never
/// abort the crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The response is not an HTML document
    #[error("unsupported content type `{content_type}` for {url}")]
    NotHtml { url: String, content_type: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The body could not be read or decoded
    #[error("failed to parse {url}: {reason}")]
    Parse { url: String, reason: String },
}

impl FetchError {
    /// Classifies a transport error, separating timeouts from other failures
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    /// URL of the page that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::NotHtml { url, .. }
            | Self::Request { url, .. }
            | Self::Parse { url, .. } => url,
        }
    }
}
