//! Helix badge API client.

use serde::Deserialize;

use crate::{BadgeError, BadgeFetch, BadgeSet, HELIX_BASE};

/// Helix response wrapper for badge sets.
#[derive(Debug, Deserialize)]
pub(crate) struct BadgeResponse {
    pub(crate) data: Vec<BadgeSet>,
}

/// HTTP client for the Helix chat badge endpoints.
pub struct BadgeClient {
    client_id: String,
    access_token: String,
    http: reqwest::Client,
}

impl BadgeClient {
    pub fn new(client_id: String, access_token: String) -> Self {
        Self {
            client_id,
            access_token,
            http: reqwest::Client::new(),
        }
    }

    /// Send an authenticated GET request and parse the badge records.
    async fn fetch(&self, url: &str) -> Result<Vec<BadgeSet>, BadgeError> {
        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Client-Id", &self.client_id)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(BadgeError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let resp: BadgeResponse = serde_json::from_str(&body)?;
        Ok(resp.data)
    }
}

impl BadgeFetch for BadgeClient {
    async fn fetch_global(&self) -> Result<Vec<BadgeSet>, BadgeError> {
        let url = format!("{HELIX_BASE}/chat/badges/global");
        let sets = self.fetch(&url).await?;
        tracing::debug!(count = sets.len(), "Fetched global badges");
        Ok(sets)
    }

    async fn fetch_channel(&self, room_id: &str) -> Result<Vec<BadgeSet>, BadgeError> {
        let url = format!("{HELIX_BASE}/chat/badges?broadcaster_id={room_id}");
        let sets = self.fetch(&url).await?;
        tracing::debug!(count = sets.len(), room_id, "Fetched channel badges");
        Ok(sets)
    }
}
