//! Transport adapters: how snapshots are pulled and change signals arrive.
//!
//! The engine itself never touches the network. It is driven through two
//! narrow surfaces — a [`SnapshotSource`] it pulls full canvases from, and
//! a stream of [`crate::listener::ChangeSignal`]s pushed at it — and this
//! module ships the production implementations of both: an HTTP pull in
//! [`http`] and a reconnecting websocket reader in [`ws`]. Tests and
//! embedders with other plumbing swap in their own.

pub mod http;
pub mod ws;

use async_trait::async_trait;
use thiserror::Error;

/// Why a snapshot pull produced no canvas.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed cleanly: connect failure, timeout, or a
    /// non-success status from the relay.
    #[error("canvas fetch failed: {0}")]
    Transport(String),
    /// The response arrived but did not carry a canvas payload.
    #[error("canvas payload malformed: {0}")]
    Payload(String),
}

/// Source of full canvas snapshots.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Pulls the current full-canvas encoding.
    ///
    /// # Errors
    ///
    /// [`FetchError`] for transport failures and malformed payloads alike.
    /// The caller treats every failure the same way: the previous canvas
    /// stays up and the pull is retried on the next change signal.
    async fn fetch(&self) -> Result<String, FetchError>;
}
