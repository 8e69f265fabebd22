use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::extract::looks_like_product_page;
use crate::identifier::Identifier;
use crate::rate_limit::{retry_with_backoff, RequestGate};
use crate::types::FetchedPage;

/// Base URL for the international product pages.
const WORLD_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Base URL for the French mirror, tried when the international page does not
/// resolve to a product.
const FRENCH_BASE_URL: &str = "https://fr.openfoodfacts.org";

/// HTTP client for product pages.
///
/// Handles not-found (404), rate limiting (429), and other non-2xx responses
/// as typed errors. Transient errors (429, 5xx, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts. Every request — including retries — passes through a
/// shared [`RequestGate`], so the run's aggregate request rate stays bounded
/// no matter how the individual fetches go.
pub struct PageClient {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
    world_base: String,
    french_base: String,
}

impl PageClient {
    /// Creates a `PageClient` with configured timeout, `User-Agent`, and
    /// retry policy.
    ///
    /// The user agent identifies this collector to the server; it is fixed at
    /// construction, not per call. `max_retries` is the number of additional
    /// attempts after the first failure for retriable errors; set to `0` to
    /// disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
            world_base: WORLD_BASE_URL.to_string(),
            french_base: FRENCH_BASE_URL.to_string(),
        })
    }

    /// Overrides the page base URLs. Used when the pages are served from a
    /// non-default host (and by tests against a local server).
    #[must_use]
    pub fn with_base_urls(mut self, world_base: &str, french_base: &str) -> Self {
        self.world_base = world_base.to_string();
        self.french_base = french_base.to_string();
        self
    }

    /// Retrieves the product page for `id`, preferring the international page
    /// and falling back to the French mirror when the response does not look
    /// like a product page.
    ///
    /// The fallback exists because the international site answers some
    /// barcodes with a search or landing page while the French mirror carries
    /// the actual product. The French response is returned as-is either way;
    /// extraction degrades to absent fields if it is not a product page
    /// either.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScrapeError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ScrapeError::UnexpectedStatus`] — other non-2xx status (5xx retried).
    /// - [`ScrapeError::UnexpectedContentType`] — response is not HTML.
    /// - [`ScrapeError::Http`] — network or TLS failure after all retries.
    pub async fn fetch_product_page(
        &self,
        gate: &RequestGate,
        id: &Identifier,
    ) -> Result<FetchedPage, ScrapeError> {
        let world_url = id.world_url(&self.world_base);
        let page = self.fetch_html(gate, &world_url).await?;
        if looks_like_product_page(&page.html) {
            return Ok(page);
        }

        let french_url = id.french_url(&self.french_base);
        tracing::warn!(
            url = %page.final_url,
            "response does not look like a product page — trying the French mirror"
        );
        self.fetch_html(gate, &french_url).await
    }

    /// Fetches one HTML page with rate limiting and retries.
    ///
    /// # Errors
    ///
    /// Same classification as [`Self::fetch_product_page`].
    pub async fn fetch_html(
        &self,
        gate: &RequestGate,
        url: &str,
    ) -> Result<FetchedPage, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.to_owned();
            async move {
                gate.acquire().await;
                let result = self.request_once(&url).await;
                gate.mark_complete().await;
                result
            }
        })
        .await
    }

    async fn request_once(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScrapeError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScrapeError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScrapeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        if !content_type.contains("text/html") {
            return Err(ScrapeError::UnexpectedContentType {
                url: url.to_owned(),
                content_type,
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        Ok(FetchedPage { final_url, html })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
