//! Write coordination: one pending on-chain write per pixel, resolved by
//! the wallet acknowledgement and, eventually, the authoritative broadcast.
//!
//! A pixel write has two halves. First the injected [`PixelContract`]
//! resolves — the wallet signed and the transaction was accepted, or the
//! attempt died. Acceptance still proves nothing about the canvas; only a
//! later snapshot showing the pixel does. The coordinator tracks both
//! halves per pixel, keyed by a per-attempt id so outcomes of writes that
//! were superseded by a faster re-paint fall on the floor instead of
//! touching the pixel's current state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of one write attempt.
pub type WriteId = Uuid;

/// Why a write attempt died before reaching the canvas.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The wallet, or its user, declined to sign.
    #[error("signature declined: {0}")]
    SignatureDeclined(String),
    /// The signed transaction never made it to the contract.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
}

/// The contract surface pixel writes go through. Implementations wrap
/// whatever wallet and chain plumbing the embedding application carries;
/// the engine only ever asks for one single-shot submission per pixel.
#[async_trait]
pub trait PixelContract: Send + Sync {
    /// Asks the wallet to sign and submit one pixel write. `Ok` means the
    /// transaction was accepted for processing — not that the shared
    /// canvas shows it yet.
    async fn request_write(&self, index: usize, color: u8) -> Result<(), WriteError>;
}

/// Progress of a pending write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// Submitted to the wallet, no acknowledgement yet. Wallet prompts can
    /// sit open for as long as the user ponders, so this state never
    /// times out.
    AwaitingAck,
    /// Acknowledged; waiting for a broadcast snapshot to show the pixel.
    AwaitingBroadcast {
        /// When the acknowledgement arrived; starts the confirmation grace.
        acked_at: Instant,
    },
}

/// One in-flight write attempt for a single pixel.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub id: WriteId,
    pub color: u8,
    pub submitted_at: Instant,
    pub state: WriteState,
}

/// Claim ticket returned by [`WriteCoordinator::submit`]. The id must
/// accompany the attempt's outcome back into the coordinator.
#[derive(Debug, Clone, Copy)]
pub struct WriteHandle {
    pub id: WriteId,
    pub index: usize,
    pub color: u8,
}

/// Tracks at most one pending write per pixel.
#[derive(Debug)]
pub struct WriteCoordinator {
    pending: HashMap<usize, PendingWrite>,
    confirm_grace: Duration,
}

impl WriteCoordinator {
    /// `confirm_grace` is how long an acknowledged write may wait for its
    /// broadcast before [`Self::sweep`] expires it.
    #[must_use]
    pub fn new(confirm_grace: Duration) -> Self {
        Self { pending: HashMap::new(), confirm_grace }
    }

    /// Registers a fresh attempt for `index`, superseding any write already
    /// pending there. Outcomes of the superseded attempt no longer match
    /// its id and will be ignored.
    pub fn submit(&mut self, index: usize, color: u8, now: Instant) -> WriteHandle {
        let id = Uuid::new_v4();
        self.pending.insert(
            index,
            PendingWrite { id, color, submitted_at: now, state: WriteState::AwaitingAck },
        );
        WriteHandle { id, index, color }
    }

    /// Records the wallet acknowledgement for attempt `id`. Returns `false`
    /// when that attempt is no longer the pixel's current write; a late ack
    /// changes nothing.
    pub fn confirm_submitted(&mut self, index: usize, id: WriteId, now: Instant) -> bool {
        let Some(write) = self.pending.get_mut(&index) else {
            return false;
        };
        if write.id != id {
            return false;
        }
        write.state = WriteState::AwaitingBroadcast { acked_at: now };
        true
    }

    /// Drops the pending write for attempt `id`. Returns `false` when that
    /// attempt was already superseded — nothing is dropped then, and the
    /// caller must not roll anything back.
    pub fn fail(&mut self, index: usize, id: WriteId) -> bool {
        match self.pending.get(&index) {
            Some(write) if write.id == id => {
                self.pending.remove(&index);
                true
            }
            _ => false,
        }
    }

    /// The authoritative canvas now shows this pixel's override color;
    /// whatever was pending there, acknowledged or not, has nothing left to
    /// wait for. Returns whether a write was pending.
    pub fn mark_reflected(&mut self, index: usize) -> bool {
        self.pending.remove(&index).is_some()
    }

    /// Expires acknowledged writes whose broadcast never arrived within the
    /// confirmation grace, returning the affected pixels sorted. Writes
    /// still waiting on the wallet are never expired here.
    pub fn sweep(&mut self, now: Instant) -> Vec<usize> {
        let mut expired: Vec<usize> = self
            .pending
            .iter()
            .filter(|(_, write)| match write.state {
                WriteState::AwaitingAck => false,
                WriteState::AwaitingBroadcast { acked_at } => {
                    now.duration_since(acked_at) >= self.confirm_grace
                }
            })
            .map(|(&index, _)| index)
            .collect();
        expired.sort_unstable();
        for index in &expired {
            self.pending.remove(index);
        }
        expired
    }

    /// Number of pixels with a write in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The pending write on `index`, if any.
    #[must_use]
    pub fn pending_write(&self, index: usize) -> Option<&PendingWrite> {
        self.pending.get(&index)
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
