//! Liveness-probed block height watcher.
//!
//! # Responsibilities
//! - Own the long-lived WebSocket subscription to new block headers
//! - Detect silently-dead connections via a ping/pong probe cycle
//! - Emit block heights downstream as they arrive
//! - Reconnect with completely fresh state after any transport failure
//!
//! # Design Decisions
//! - A missed pong force-closes the socket; all failure causes funnel into
//!   the same teardown-and-reconnect path
//! - Reconnects use jittered exponential backoff with a ceiling instead of
//!   an immediate retry, so an unreachable endpoint is not hot-looped
//! - The backoff attempt counter resets once a session delivers a height
//! - Heights may replay at or below previously seen values after a
//!   reconnect; consumers must compare with `>=`

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, sleep_until, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Bytes, Message};

use crate::config::schema::NetworkConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::watcher::subscription::{new_heads_request, parse_frame, Incoming};

/// Events emitted downstream by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightEvent {
    /// A fresh subscription is open. Emitted once per (re)connection.
    Connected,
    /// A new block height was observed.
    Height(u64),
}

/// Reasons a watcher session ended.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// Could not open the WebSocket connection.
    #[error("WebSocket connect failed: {0}")]
    Connect(String),

    /// No pong arrived within the expected reply window.
    #[error("liveness probe missed its reply window")]
    Stale,

    /// The remote closed the connection.
    #[error("connection closed by remote")]
    Closed,

    /// Transport-level send/receive failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Watches the chain head over a WebSocket subscription.
pub struct LivenessWatcher {
    config: NetworkConfig,
}

impl LivenessWatcher {
    /// Create a watcher from network configuration.
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Run the watch loop until the downstream receiver is dropped.
    ///
    /// Each failed session tears down the socket and all probe timers, then
    /// reconnects from scratch after a backoff delay. No state survives a
    /// reconnect except the configuration.
    pub async fn run(self, tx: mpsc::Sender<HeightEvent>) {
        let mut attempt: u32 = 0;

        loop {
            let mut delivered = false;
            match self.session(&tx, &mut delivered).await {
                Ok(()) => {
                    tracing::debug!("Downstream closed, watcher stopping");
                    return;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Connection lost");
                }
            }

            attempt = next_attempt(attempt, delivered);

            let delay = calculate_backoff(
                attempt,
                self.config.reconnect_base_ms,
                self.config.reconnect_max_ms,
            );
            tracing::info!(
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting with fresh state"
            );
            sleep(delay).await;
        }
    }

    /// Run a single connection lifetime.
    ///
    /// Returns `Ok(())` only when the downstream receiver is gone; every
    /// transport-level ending surfaces as a `WatcherError`.
    async fn session(
        &self,
        tx: &mpsc::Sender<HeightEvent>,
        delivered: &mut bool,
    ) -> Result<(), WatcherError> {
        let (ws, _) = connect_async(self.config.rpc_wss_url.as_str())
            .await
            .map_err(|e| WatcherError::Connect(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        sink.send(Message::text(new_heads_request()))
            .await
            .map_err(|e| WatcherError::Transport(e.to_string()))?;

        if tx.send(HeightEvent::Connected).await.is_err() {
            return Ok(());
        }

        let keep_alive_period = Duration::from_millis(self.config.keep_alive_interval_ms);
        let expected_pong = Duration::from_millis(self.config.expected_pong_ms);
        let mut keep_alive = interval_at(Instant::now() + keep_alive_period, keep_alive_period);
        let mut pong_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                frame = stream.next() => {
                    let msg = match frame {
                        None => return Err(WatcherError::Closed),
                        Some(Err(e)) => return Err(WatcherError::Transport(e.to_string())),
                        Some(Ok(msg)) => msg,
                    };
                    match msg {
                        Message::Text(text) => match parse_frame(text.as_str()) {
                            Some(Incoming::NewHead { height }) => {
                                *delivered = true;
                                if tx.send(HeightEvent::Height(height)).await.is_err() {
                                    return Ok(());
                                }
                            }
                            Some(Incoming::Ack { subscription }) => {
                                tracing::info!(subscription = %subscription, "Subscribed to new heads");
                            }
                            Some(Incoming::Unrelated) | None => {
                                tracing::debug!("Ignoring unrelated frame");
                            }
                        },
                        Message::Pong(_) => {
                            pong_deadline = None;
                        }
                        Message::Ping(payload) => {
                            sink.send(Message::Pong(payload))
                                .await
                                .map_err(|e| WatcherError::Transport(e.to_string()))?;
                        }
                        Message::Close(_) => return Err(WatcherError::Closed),
                        _ => {}
                    }
                }
                _ = keep_alive.tick() => {
                    sink.send(Message::Ping(Bytes::new()))
                        .await
                        .map_err(|e| WatcherError::Transport(e.to_string()))?;
                    if pong_deadline.is_none() {
                        pong_deadline = Some(Instant::now() + expected_pong);
                    }
                }
                _ = deadline_expired(pong_deadline) => {
                    // Force-close the transport; teardown happens in run().
                    let _ = sink.send(Message::Close(None)).await;
                    return Err(WatcherError::Stale);
                }
            }
        }
    }
}

/// Next value of the reconnect attempt counter.
///
/// A session that delivered at least one height proves the endpoint was
/// healthy, so the next failure starts the backoff schedule over instead
/// of continuing from the accumulated count.
fn next_attempt(attempt: u32, delivered: bool) -> u32 {
    if delivered {
        1
    } else {
        attempt.saturating_add(1)
    }
}

/// Resolves when the armed deadline passes; pends forever while disarmed.
async fn deadline_expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
