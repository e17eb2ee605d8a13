use std::sync::Arc;

use badge_client::{BadgeCache, BadgeClient};
use tokio::sync::broadcast;

use crate::config::AppConfig;

/// Application shared state accessible from the event pump and axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Broadcast channel for overlay WebSocket payloads
    ws_tx: broadcast::Sender<String>,
    /// Application configuration
    config: AppConfig,
    /// Badge table cache
    badges: BadgeCache<BadgeClient>,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let (ws_tx, _) = broadcast::channel(2048);

        let client = config.badge_lookup_enabled().then(|| {
            BadgeClient::new(config.client_id.clone(), config.access_token.clone())
        });
        if client.is_none() {
            tracing::info!("Badge lookup not configured; messages will carry no badges");
        }

        Self {
            inner: Arc::new(SharedStateInner {
                ws_tx,
                config,
                badges: BadgeCache::new(client),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn ws_sender(&self) -> &broadcast::Sender<String> {
        &self.inner.ws_tx
    }

    pub fn subscribe_ws(&self) -> broadcast::Receiver<String> {
        self.inner.ws_tx.subscribe()
    }

    pub fn badges(&self) -> &BadgeCache<BadgeClient> {
        &self.inner.badges
    }
}
