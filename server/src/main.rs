//! Headless chat overlay server.
//!
//! Connects to chat, decodes messages, resolves badges, and broadcasts
//! renderable events to overlay pages over a local WebSocket.

mod config;
mod irc;
mod server;
mod state;

use chat_decoder::ChatEvent;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::irc::IrcClient;
use crate::state::SharedState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting chat overlay server");

    let config = AppConfig::load();
    if config.channel.is_empty() {
        anyhow::bail!("CHANNEL is not set");
    }
    let state = SharedState::new(config);

    // Web server
    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    // Chat transport
    let (event_rx, chat_shutdown) = IrcClient::connect(state.config().channel.clone());

    // Event pump
    let s = state.clone();
    tokio::spawn(async move { pump_events(s, event_rx).await });

    tracing::info!(
        port = state.server_port(),
        channel = %state.config().channel,
        "Overlay server running. Press Ctrl+C to stop."
    );

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    let _ = chat_shutdown.send(()).await;
    server_handle.abort();
    Ok(())
}

/// Forward decoded chat events to overlay clients, badges resolved.
async fn pump_events(state: SharedState, mut event_rx: mpsc::Receiver<ChatEvent>) {
    while let Some(event) = event_rx.recv().await {
        let badges = state
            .badges()
            .resolve_badges(&event.badge_keys, &event.room_id)
            .await;

        let payload = serde_json::json!({
            "type": "chat-message",
            "data": {
                "name": event.name,
                "color": event.color,
                "fragments": event.fragments,
                "badges": badges,
                "roomId": event.room_id,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });
        // A send error just means no overlay client is connected yet.
        let _ = state.ws_sender().send(payload.to_string());
    }
}
