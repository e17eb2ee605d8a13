//! Chat badge lookup client library.
//!
//! Fetches global and per-channel chat badge tables from the Helix API and
//! caches them for the lifetime of the process, with at most one fetch per
//! table regardless of concurrent demand. Badge keys of the form
//! `"setId/versionId"` resolve to image URLs through the cache.

pub mod api;
pub mod cache;

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

pub use api::BadgeClient;
pub use cache::BadgeCache;

pub(crate) const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// A badge set with its versions, as returned by Helix `chat/badges`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeSet {
    pub set_id: String,
    #[serde(default)]
    pub versions: Vec<BadgeVersion>,
}

/// One version of a badge with image URLs at different scales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeVersion {
    pub id: String,
    #[serde(default)]
    pub image_url_1x: String,
    #[serde(default)]
    pub image_url_2x: String,
    #[serde(default)]
    pub image_url_4x: String,
}

/// Flattened `"setId/versionId"` -> image URL mapping.
pub type BadgeTable = HashMap<String, String>;

/// Unified error type for the badge-client crate.
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Badge API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Badge fetch timeout")]
    Timeout,
}

/// Source of badge table records.
///
/// Implemented by [`BadgeClient`] for Helix; the cache is generic over this
/// so fetch behavior can be stubbed in tests.
pub trait BadgeFetch: Send + Sync + 'static {
    fn fetch_global(&self) -> impl Future<Output = Result<Vec<BadgeSet>, BadgeError>> + Send;

    fn fetch_channel(
        &self,
        room_id: &str,
    ) -> impl Future<Output = Result<Vec<BadgeSet>, BadgeError>> + Send;
}

/// Flatten badge records into a `"setId/versionId"` -> URL lookup table.
pub fn flatten_badge_sets(sets: Vec<BadgeSet>) -> BadgeTable {
    let mut table = BadgeTable::new();
    for set in sets {
        for version in set.versions {
            table.insert(
                format!("{}/{}", set.set_id, version.id),
                version.image_url_1x,
            );
        }
    }
    table
}
