//! Change-signal feed: a reconnecting websocket reader.
//!
//! The relay broadcasts a message whenever any pixel changes. Messages are
//! hints, not diffs — the text is only used for de-duplication, and every
//! accepted hint leads to a full snapshot pull elsewhere. The reader
//! forwards each text frame as a [`ChangeSignal`], reconnects forever with
//! capped exponential backoff, and winds down only once the signal
//! receiver is gone.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::listener::ChangeSignal;

/// Path of the change-signal endpoint, relative to the relay base URL.
const SIGNAL_PATH: &str = "/ws";

/// First reconnect delay.
const RECONNECT_BASE_MS: u64 = 1000;

/// Reconnect delay ceiling.
const RECONNECT_MAX_MS: u64 = 10_000;

/// Derives the change-feed URL from the relay's HTTP base URL: the scheme
/// swaps to its websocket twin (`http` to `ws`, `https` to `wss`) and the
/// signal path is appended. A base already carrying a websocket scheme is
/// kept as is.
#[must_use]
pub fn signal_feed_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let swapped = if let Some(rest) = base.strip_prefix("https") {
        format!("wss{rest}")
    } else if let Some(rest) = base.strip_prefix("http") {
        format!("ws{rest}")
    } else {
        base.to_string()
    };
    format!("{swapped}{SIGNAL_PATH}")
}

/// Parses one feed message. A JSON object carrying a numeric `seq` field
/// tags the signal for ordering; anything else rides along as an opaque
/// payload and gets de-duplicated by identity.
#[must_use]
pub fn signal_from_text(text: &str) -> ChangeSignal {
    let seq = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => value.get("seq").and_then(|v| v.as_u64()),
        Err(_) => None,
    };
    ChangeSignal { seq, payload: text.to_string() }
}

/// Spawns the feed reader. Signals flow into `signals` until its receiver
/// is dropped, at which point the task stops instead of reconnecting.
pub fn spawn_signal_feed(url: String, signals: mpsc::Sender<ChangeSignal>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut backoff_ms: u64 = RECONNECT_BASE_MS;
        loop {
            match connect_and_read(&url, &signals).await {
                Ok(()) => info!(url = %url, "signal feed disconnected"),
                Err(err) => warn!(url = %url, error = %err, "signal feed failed"),
            }

            if signals.is_closed() {
                info!(url = %url, "signal receiver gone; feed reader stopping");
                return;
            }

            // Exponential backoff before reconnect.
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = (backoff_ms * 2).min(RECONNECT_MAX_MS);
        }
    })
}

/// One connection's lifetime: read frames until the peer closes, the link
/// errors, or the receiver disappears.
async fn connect_and_read(
    url: &str,
    signals: &mpsc::Sender<ChangeSignal>,
) -> Result<(), String> {
    let (ws, _response) = connect_async(url).await.map_err(|err| err.to_string())?;
    info!(url = %url, "signal feed connected");

    let (_write, mut read) = ws.split();
    while let Some(message) = read.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let signal = signal_from_text(text.as_str());
                if signals.send(signal).await.is_err() {
                    // Receiver gone; the outer loop will notice and stop.
                    return Ok(());
                }
            }
            Ok(Message::Close(_)) => return Ok(()),
            Ok(_) => debug!("non-text feed message ignored"),
            Err(err) => return Err(err.to_string()),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;
