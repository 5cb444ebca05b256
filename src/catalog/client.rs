//! Google Books volumes client - tiered catalog lookup for local items.
//!
//! The [`GoogleBooksClient`] queries the volumes search endpoint to find the
//! catalog record for a local e-book. Lookup is tiered: an ISBN query first
//! when the item carries one, then a title/author query. The first result of
//! the first tier that matches wins; a miss at both tiers is an
//! [`Reconciliation::Unmatched`], never an error.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::extract::LocalMetadata;
use crate::user_agent;

use super::Reconciliation;
use super::volume::{VolumeRecord, VolumesResponse};

/// Default Google Books API base URL.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Connect timeout for catalog requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for catalog requests.
const READ_TIMEOUT_SECS: u64 = 30;

/// Looks up catalog records for local items via the Google Books volumes API.
///
/// The client is designed to be created once and reused across the whole
/// library pass, taking advantage of connection pooling. Every failure mode
/// (transport error, non-success status, malformed body, empty result) is
/// absorbed into "no record at this tier" - a flaky catalog degrades a run,
/// it never aborts one.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleBooksClient {
    /// Creates a new client against the public Google Books API.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::build(DEFAULT_BASE_URL.to_string())
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url.into())
    }

    #[allow(clippy::expect_used)]
    fn build(base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .user_agent(user_agent::default_http_user_agent())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client, base_url }
    }

    /// Resolves one local item against the catalog.
    ///
    /// Tier 1 queries `isbn:<identifier>` when the item has an ISBN. Tier 2
    /// falls back to `<title>+inauthor:<author>` with spaces joined by `+`.
    /// Each tier is attempted exactly once, in order, with no retries; the
    /// first record of the first responding tier wins.
    #[tracing::instrument(skip(self, item), fields(title = %item.title))]
    pub async fn resolve(&self, item: &LocalMetadata) -> Reconciliation {
        if let Some(isbn) = &item.isbn {
            debug!(%isbn, "trying ISBN lookup tier");
            if let Some(record) = self.search_volumes(&format!("isbn:{isbn}")).await {
                return Reconciliation::Matched(record);
            }
        }

        let fallback_query =
            format!("{}+inauthor:{}", item.title, item.author).replace(' ', "+");
        debug!(query = %fallback_query, "trying title/author lookup tier");
        match self.search_volumes(&fallback_query).await {
            Some(record) => Reconciliation::Matched(record),
            None => Reconciliation::Unmatched,
        }
    }

    /// Runs one volumes search and returns the first record, if any.
    ///
    /// `query` is interpolated into the URL as-is; remaining reserved
    /// characters are percent-encoded during URL parsing inside reqwest.
    async fn search_volumes(&self, query: &str) -> Option<VolumeRecord> {
        let url = format!("{}/volumes?q={}", self.base_url, query);
        debug!(api_url = %url, "Calling Google Books volumes API");

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Google Books API request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(
                status = status.as_u16(),
                "Google Books API returned non-success status"
            );
            return None;
        }

        let body = match response.json::<VolumesResponse>().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Failed to parse Google Books response JSON");
                return None;
            }
        };

        let first = body.items.and_then(|items| items.into_iter().next());
        if first.is_none() {
            debug!("Google Books query matched no volumes");
        }
        first.map(|item| item.volume_info)
    }
}
