//! HTTP client creation and feed retrieval.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::header;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::TARGET_WEB_REQUEST;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = concat!(
    "rss-reformatter/",
    env!("CARGO_PKG_VERSION"),
    " (feed archive bot)"
);

const ACCEPT: &str =
    "application/rss+xml, application/atom+xml, application/feed+json, application/xml, text/xml, */*;q=0.9";

/// Create the shared HTTP client used for all feed requests.
pub fn create_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .gzip(true)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch a feed document. Requests identify themselves with a descriptive
/// user agent and are bounded by [`REQUEST_TIMEOUT`]; a non-2xx response is
/// a failure.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<String> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting feed from {}", url);

    let response = timeout(
        REQUEST_TIMEOUT,
        client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, ACCEPT)
            .send(),
    )
    .await
    .map_err(|_| {
        anyhow!(
            "Request to {} timed out after {} seconds",
            url,
            REQUEST_TIMEOUT.as_secs()
        )
    })?
    .with_context(|| format!("Request to {} failed", url))?;

    if !response.status().is_success() {
        warn!(
            target: TARGET_WEB_REQUEST,
            "Non-success status {} from {}",
            response.status(),
            url
        );
        bail!("HTTP error {} from {}", response.status(), url);
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {}", url))
}
