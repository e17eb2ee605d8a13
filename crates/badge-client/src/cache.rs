//! Badge lookup cache and key resolution.
//!
//! Each table (the global one, or one per room id) is fetched at most once
//! for the lifetime of the process; concurrent callers share the in-flight
//! fetch. A failed or timed-out fetch populates its slot with an empty
//! table, so failures are cached and never retried.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};

use crate::{BadgeError, BadgeFetch, BadgeTable, flatten_badge_sets};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

type Slot = Arc<OnceCell<Arc<BadgeTable>>>;

/// Process-wide cache of the global and per-channel badge tables.
pub struct BadgeCache<F: BadgeFetch> {
    fetcher: Option<F>,
    global: Slot,
    channels: Mutex<HashMap<String, Slot>>,
}

impl<F: BadgeFetch> BadgeCache<F> {
    /// Create a cache backed by `fetcher`.
    ///
    /// With `None` (no lookup endpoint configured) every fetch is a no-op
    /// and all keys resolve to nothing.
    pub fn new(fetcher: Option<F>) -> Self {
        Self {
            fetcher,
            global: Slot::default(),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve badge keys to image URLs for a room.
    ///
    /// The room's channel table takes precedence over the global table;
    /// keys found in neither are omitted. Output order follows input order.
    /// Never fails; at worst the result is empty.
    pub async fn resolve_badges(&self, keys: &[String], room_id: &str) -> Vec<String> {
        if keys.is_empty() {
            return Vec::new();
        }

        let channel = self.channel_table(room_id).await;
        let global = self.global_table().await;

        keys.iter()
            .filter_map(|key| channel.get(key).or_else(|| global.get(key)))
            .cloned()
            .collect()
    }

    async fn global_table(&self) -> Arc<BadgeTable> {
        self.populate(self.global.clone(), None).await
    }

    async fn channel_table(&self, room_id: &str) -> Arc<BadgeTable> {
        if room_id.is_empty() {
            return Arc::new(BadgeTable::new());
        }
        let slot = {
            let mut channels = self.channels.lock().await;
            channels.entry(room_id.to_string()).or_default().clone()
        };
        self.populate(slot, Some(room_id)).await
    }

    /// Initialize a cache slot, fetching its table at most once.
    async fn populate(&self, slot: Slot, room_id: Option<&str>) -> Arc<BadgeTable> {
        slot.get_or_init(|| async {
            let Some(fetcher) = self.fetcher.as_ref() else {
                return Arc::new(BadgeTable::new());
            };

            let fetch = async {
                match room_id {
                    Some(id) => fetcher.fetch_channel(id).await,
                    None => fetcher.fetch_global().await,
                }
            };
            let result = tokio::time::timeout(FETCH_TIMEOUT, fetch)
                .await
                .unwrap_or(Err(BadgeError::Timeout));

            match result {
                Ok(sets) => {
                    let table = flatten_badge_sets(sets);
                    tracing::debug!(
                        scope = room_id.unwrap_or("global"),
                        count = table.len(),
                        "Badge table cached"
                    );
                    Arc::new(table)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        scope = room_id.unwrap_or("global"),
                        "Badge fetch failed; caching empty table"
                    );
                    Arc::new(BadgeTable::new())
                }
            }
        })
        .await
        .clone()
    }
}
