//! Anonymous IRC-over-WebSocket chat transport.
//!
//! Connects to the Twitch chat WebSocket endpoint, joins a single channel,
//! and feeds decoded chat events through an mpsc channel. Handles PING/PONG
//! and automatic reconnection with exponential backoff. Only lines carrying
//! a channel-message marker are handed to the decoder; every other protocol
//! line is consumed here.

use std::time::{Duration, Instant};

use chat_decoder::ChatEvent;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;

const CHAT_WS_URL: &str = "wss://irc-ws.chat.twitch.tv:443";
// The server pings every five minutes; a silent socket past this is dead.
const READ_TIMEOUT: Duration = Duration::from_secs(6 * 60);
const BASE_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const FAILURE_RESET_WINDOW: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, thiserror::Error)]
pub enum IrcError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed by server")]
    Closed,

    #[error("Read timeout")]
    Timeout,
}

/// Chat transport client with auto-reconnect.
///
/// Decoded events are delivered via `mpsc::Receiver<ChatEvent>`.
pub struct IrcClient;

impl IrcClient {
    /// Start the chat read loop. Returns an event receiver and shutdown sender.
    pub fn connect(channel: String) -> (mpsc::Receiver<ChatEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = mpsc::channel::<ChatEvent>(256);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(Self::run_loop(channel, event_tx, shutdown_rx));
        (event_rx, shutdown_tx)
    }

    async fn run_loop(
        channel: String,
        event_tx: mpsc::Sender<ChatEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut failures: u32 = 0;
        let mut last_failure_at: Option<Instant> = None;
        loop {
            if shutdown_rx.try_recv().is_ok() {
                tracing::info!("Chat shutdown requested");
                return;
            }
            if let Some(last_failure) = last_failure_at {
                if last_failure.elapsed() >= FAILURE_RESET_WINDOW {
                    if failures > 0 {
                        tracing::info!(failures, "Chat failures reset after stable interval");
                    }
                    failures = 0;
                    last_failure_at = None;
                }
            }
            match Self::connect_once(&channel, &event_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Chat connection closed cleanly");
                    return;
                }
                Err(e) => {
                    failures += 1;
                    last_failure_at = Some(Instant::now());
                    let backoff = Self::backoff_duration(failures);
                    tracing::warn!(
                        error = %e, attempt = failures,
                        backoff_secs = backoff.as_secs(),
                        "Chat connection failed, will reconnect"
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Chat shutdown requested during reconnect backoff");
                            return;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }

    async fn connect_once(
        channel: &str,
        event_tx: &mpsc::Sender<ChatEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<(), IrcError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(channel, "Connecting to chat WebSocket");
        let (mut ws, _) = connect_async(CHAT_WS_URL).await?;

        let nick = anonymous_nick();
        ws.send(Msg::Text(
            "CAP REQ :twitch.tv/tags twitch.tv/commands".into(),
        ))
        .await?;
        ws.send(Msg::Text(format!("NICK {nick}").into())).await?;
        ws.send(Msg::Text(format!("JOIN #{channel}").into())).await?;
        tracing::info!(nick, channel, "Joined chat channel");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Chat shutdown during listen");
                    let _ = ws.close(None).await;
                    return Ok(());
                }
                result = tokio::time::timeout(READ_TIMEOUT, ws.next()) => {
                    match result {
                        Ok(Some(Ok(Msg::Text(frame)))) => {
                            for line in frame.lines().filter(|line| !line.is_empty()) {
                                if let Some(reply) = ping_reply(line) {
                                    ws.send(Msg::Text(reply.into())).await?;
                                } else if is_chat_line(line) {
                                    match chat_decoder::parse_line(line) {
                                        Some(event) => {
                                            let _ = event_tx.send(event).await;
                                        }
                                        None => {
                                            tracing::trace!(line, "Chat line without payload delimiter");
                                        }
                                    }
                                }
                            }
                        }
                        Ok(Some(Ok(Msg::Ping(data)))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Ok(Some(Ok(Msg::Close(_)))) | Ok(None) => {
                            tracing::warn!("Chat WebSocket closed by server");
                            return Err(IrcError::Closed);
                        }
                        Ok(Some(Err(e))) => return Err(IrcError::WebSocket(e)),
                        Ok(Some(Ok(_))) => {}
                        Err(_) => {
                            tracing::warn!("Chat read timeout");
                            return Err(IrcError::Timeout);
                        }
                    }
                }
            }
        }
    }

    fn backoff_duration(failures: u32) -> Duration {
        let d = BASE_BACKOFF * 2u32.saturating_pow(failures.saturating_sub(1));
        d.min(MAX_BACKOFF)
    }
}

/// Whether a raw line carries a channel chat message.
fn is_chat_line(line: &str) -> bool {
    line.contains("PRIVMSG")
}

/// Reply for a server `PING` line, if the line is one.
fn ping_reply(line: &str) -> Option<String> {
    line.strip_prefix("PING").map(|rest| format!("PONG{rest}"))
}

/// One-shot nick for Twitch's anonymous read-only login.
fn anonymous_nick() -> String {
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    format!("justinfan{}", 10_000 + seed % 80_000)
}

#[cfg(test)]
mod tests {
    use super::{anonymous_nick, is_chat_line, ping_reply};

    #[test]
    fn only_channel_messages_reach_the_decoder() {
        assert!(is_chat_line(
            "@room-id=42 :bob!bob@bob.tmi.twitch.tv PRIVMSG #ch :hi"
        ));
        assert!(!is_chat_line(":tmi.twitch.tv 001 justinfan123 :Welcome"));
        assert!(!is_chat_line("PING :tmi.twitch.tv"));
    }

    #[test]
    fn ping_lines_get_matching_pong_replies() {
        assert_eq!(
            ping_reply("PING :tmi.twitch.tv").as_deref(),
            Some("PONG :tmi.twitch.tv")
        );
        assert!(ping_reply(":tmi.twitch.tv PONG").is_none());
    }

    #[test]
    fn anonymous_nick_is_well_formed() {
        let nick = anonymous_nick();
        let digits = nick.strip_prefix("justinfan").unwrap();
        assert!(digits.parse::<u64>().is_ok());
    }
}
