//! Catalog listing fetcher.
//!
//! The listing page embeds its data as a JSON blob inside a script tag; the
//! fetcher cuts the blob out between two literal markers and parses it. The
//! markers are coupled to the undocumented upstream page format: when the
//! page changes shape the fetch fails loudly instead of reporting an empty
//! listing.

use std::time::Duration;

use reqwest::Client;

use crate::catalog::types::{Beatmapset, ListingPayload};
use crate::config::ListingConfig;
use crate::{MapwatchError, Result};

/// Literal prefix of the embedded listing payload.
pub const PAYLOAD_PREFIX: &str = "{\"beatmapsets\":[{\"id\"";

/// Terminator of the embedding script tag.
pub const PAYLOAD_END: &str = "</script>";

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for listing fetches.
const USER_AGENT: &str = "mapwatch/0.1 (ranked map watcher)";

/// Source of the current catalog listing.
#[allow(async_fn_in_trait)]
pub trait ListingSource {
    /// Fetch the current listing snapshot, in listing order.
    async fn fetch(&self) -> Result<Vec<Beatmapset>>;
}

/// HTTP fetcher for the beatmap listing page.
#[derive(Debug)]
pub struct CatalogFetcher {
    client: Client,
    url: String,
}

impl CatalogFetcher {
    /// Create a fetcher from the listing configuration.
    pub fn new(config: &ListingConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.url)
            .map_err(|e| MapwatchError::Config(format!("invalid listing URL: {e}")))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(MapwatchError::Config(format!(
                    "unsupported listing URL scheme: {scheme}"
                )));
            }
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MapwatchError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

impl ListingSource for CatalogFetcher {
    async fn fetch(&self) -> Result<Vec<Beatmapset>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MapwatchError::Fetch(format!("failed to fetch listing: {e}")))?;

        if !response.status().is_success() {
            return Err(MapwatchError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapwatchError::Fetch(format!("failed to read response: {e}")))?;

        parse_listing(&body)
    }
}

/// Extract and parse the embedded payload from a listing page body.
pub fn parse_listing(body: &str) -> Result<Vec<Beatmapset>> {
    let payload = extract_payload(body)?;
    let listing: ListingPayload = serde_json::from_str(payload)
        .map_err(|e| MapwatchError::Parse(format!("listing payload is not valid JSON: {e}")))?;

    listing
        .beatmapsets
        .into_iter()
        .map(Beatmapset::from_raw)
        .collect()
}

/// Cut the payload substring out of the page body.
fn extract_payload(body: &str) -> Result<&str> {
    let begin = body.find(PAYLOAD_PREFIX).ok_or_else(|| {
        MapwatchError::Fetch("listing payload marker not found in response".to_string())
    })?;
    let end = body[begin..]
        .find(PAYLOAD_END)
        .map(|offset| begin + offset)
        .ok_or_else(|| {
            MapwatchError::Fetch("listing payload terminator not found in response".to_string())
        })?;
    Ok(&body[begin..end])
}
