//! Outbound message transport.
//!
//! Delivery goes through the messaging backend's HTTP API; from the
//! poller's perspective a send either succeeds or is logged and forgotten.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::config::ApiConfig;
use crate::{MapwatchError, Result};

/// Request timeout for outbound sends in seconds.
const SEND_TIMEOUT_SECS: u64 = 10;

/// Destination for rendered push messages.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    /// Send `text` to the group identified by `group_id`.
    async fn send(&self, group_id: i64, text: &str) -> Result<()>;
}

/// Notifier backed by a OneBot-compatible HTTP API.
pub struct ApiSender {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiSender {
    /// Create a sender from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| MapwatchError::Notify(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }
}

impl Notifier for ApiSender {
    async fn send(&self, group_id: i64, text: &str) -> Result<()> {
        let url = format!("{}/send_group_msg", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .json(&json!({ "group_id": group_id, "message": text }));
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MapwatchError::Notify(format!("send_group_msg request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(MapwatchError::Notify(format!(
                "send_group_msg HTTP error: {}",
                response.status()
            )));
        }

        Ok(())
    }
}
