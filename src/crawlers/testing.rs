//! In-memory `Fetcher` for crawl tests

use crate::crawlers::fetcher::{FetchedDocument, Fetcher};
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

enum StaticResponse {
    Document(FetchedDocument),
    Status(u16),
    Timeout,
}

/// Serves canned documents; unknown URLs answer 404
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, StaticResponse>,
    head_ok: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

fn key(url: &str) -> String {
    Url::parse(url).unwrap().to_string()
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.redirect(url, url, html)
    }

    /// `url` is served from `final_url`
    pub fn redirect(mut self, url: &str, final_url: &str, html: &str) -> Self {
        self.responses.insert(
            key(url),
            StaticResponse::Document(FetchedDocument {
                final_url: Url::parse(final_url).unwrap(),
                content_type: Some("text/html; charset=utf-8".to_string()),
                body: html.to_string(),
            }),
        );
        self
    }

    pub fn document(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.responses.insert(
            key(url),
            StaticResponse::Document(FetchedDocument {
                final_url: Url::parse(url).unwrap(),
                content_type: Some(content_type.to_string()),
                body: body.to_string(),
            }),
        );
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(key(url), StaticResponse::Status(status));
        self
    }

    pub fn timeout(mut self, url: &str) -> Self {
        self.responses.insert(key(url), StaticResponse::Timeout);
        self
    }

    /// HEAD requests to `url` succeed
    pub fn head_ok(mut self, url: &str) -> Self {
        self.head_ok.insert(key(url));
        self
    }

    /// Every URL requested so far, GET and HEAD, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        let wanted = key(url);
        self.requests().iter().filter(|r| **r == wanted).count()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn get(&self, url: &Url, _timeout: Duration) -> Result<FetchedDocument, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        tokio::task::yield_now().await;

        match self.responses.get(url.as_str()) {
            Some(StaticResponse::Document(document)) => Ok(document.clone()),
            Some(StaticResponse::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(StaticResponse::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn head(&self, url: &Url, _timeout: Duration) -> Result<(), FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        if self.head_ok.contains(url.as_str()) {
            Ok(())
        } else {
            Err(FetchError::Timeout {
                url: url.to_string(),
            })
        }
    }
}
