use crate::crawlers::fetcher::Fetcher;
use crate::error::ScrapeError;
use crate::filter::normalize_url;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid scheme regex"));

/// Canonicalize a raw seed address
///
/// A missing scheme is inferred. Plain-HTTP seeds are upgraded to HTTPS when a
/// HEAD probe of the HTTPS equivalent succeeds; a failed probe keeps HTTP.
/// Only a malformed address is an error, and it is reported before any request.
pub async fn normalize_seed<F: Fetcher + ?Sized>(
    raw: &str,
    fetcher: &F,
    probe_timeout: Duration,
) -> Result<String, ScrapeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::invalid_seed(raw, "empty address"));
    }

    let candidate = if SCHEME_PREFIX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let parsed = seed_url(&candidate)?;
    if parsed.scheme() == "https" {
        return Ok(candidate);
    }

    let Some((_, rest)) = candidate.split_once("://") else {
        return Ok(candidate);
    };
    let secure = format!("https://{}", rest);
    let Ok(secure_url) = Url::parse(&secure) else {
        return Ok(candidate);
    };

    match fetcher.head(&secure_url, probe_timeout).await {
        Ok(()) => {
            ::log::debug!("Upgrading {} to HTTPS", candidate);
            Ok(secure)
        }
        Err(e) => {
            ::log::debug!("HTTPS probe failed, keeping {}: {}", candidate, e);
            Ok(candidate)
        }
    }
}

/// Parse a normalized seed into the URL crawls start from
///
/// The seed must be absolute http(s) with a host. Its fragment and query are
/// dropped, the same way discovered links are normalized.
pub fn seed_url(seed: &str) -> Result<Url, ScrapeError> {
    let url = Url::parse(seed).map_err(|e| ScrapeError::invalid_seed(seed, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScrapeError::invalid_seed(
            seed,
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ScrapeError::invalid_seed(seed, "missing host"));
    }

    Ok(normalize_url(&url))
}
