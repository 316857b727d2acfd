use crate::error::{FetchError, ScrapeError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Redirects followed before a fetch gives up
const MAX_REDIRECTS: usize = 10;

/// A response body together with where it was actually served from
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Location after following redirects
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedDocument {
    /// Documents without a content type are treated as HTML
    pub fn is_html(&self) -> bool {
        self.content_type.as_deref().is_none_or(|content_type| {
            let content_type = content_type.to_ascii_lowercase();
            content_type.contains("text/html") || content_type.contains("application/xhtml")
        })
    }
}

/// HTTP document fetch collaborator
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`, following redirects; non-2xx responses are errors
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedDocument, FetchError>;

    /// HEAD `url`; succeeds only on a 2xx response
    async fn head(&self, url: &Url, timeout: Duration) -> Result<(), FetchError>;
}

/// GET `url` and reject anything that is not an HTML document
pub async fn fetch_html<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &Url,
    timeout: Duration,
) -> Result<FetchedDocument, FetchError> {
    let document = fetcher.get(url, timeout).await?;
    if !document.is_html() {
        return Err(FetchError::NotHtml {
            url: url.to_string(),
            content_type: document.content_type.unwrap_or_default(),
        });
    }
    Ok(document)
}

/// `Fetcher` backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &Url, timeout: Duration) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        if final_url != *url {
            ::log::debug!("{} redirected to {}", url, final_url);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Parse {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        Ok(FetchedDocument {
            final_url,
            content_type,
            body,
        })
    }

    async fn head(&self, url: &Url, timeout: Duration) -> Result<(), FetchError> {
        let response = self
            .client
            .head(url.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}
