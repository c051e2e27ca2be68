//! The synchronization engine: a deterministic core gluing the snapshot
//! store, signal triage, the paint gesture, and write coordination into
//! one state machine.
//!
//! Every input method returns the [`Action`]s the host must perform, in
//! order. Nothing here touches the network or reads the clock on its own;
//! time comes in as explicit instants and I/O results come back through
//! [`SyncEngine::handle_snapshot`] and [`SyncEngine::handle_write_ack`].
//! That keeps every interleaving — slow fetches, late wallet outcomes,
//! signal bursts mid-drag — testable without an executor.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::codec::{Grid, GridSpec};
use crate::listener::{ChangeSignal, RefreshListener, SignalDecision};
use crate::net::FetchError;
use crate::session::{PaintSession, WriteIntent};
use crate::store::CanvasStore;
use crate::writer::{WriteCoordinator, WriteError, WriteId};

/// Side effect requested from the host, to be performed in list order.
#[derive(Debug, Clone)]
pub enum Action {
    /// Fetch a full snapshot and feed the outcome back into
    /// [`SyncEngine::handle_snapshot`] together with this generation.
    Fetch { generation: u64 },
    /// Ask the contract to write one pixel and feed the outcome back into
    /// [`SyncEngine::handle_write_ack`] together with this id.
    SubmitWrite { id: WriteId, index: usize, color: u8 },
    /// The composite view changed; re-render from [`SyncEngine::view`].
    ViewChanged,
    /// Surface a notice to the user.
    Notify(Notice),
}

/// User-facing trouble reports. How they are rendered is the host's
/// business; the engine only states what happened.
#[derive(Debug, Clone)]
pub enum Notice {
    /// A snapshot refresh failed; the previous canvas stays up.
    RefreshFailed { detail: String },
    /// A pixel write was declined or lost; its optimistic color was
    /// rolled back.
    WriteRejected { index: usize, detail: String },
}

/// The client-side state machine for one shared canvas.
pub struct SyncEngine {
    pub store: CanvasStore,
    pub listener: RefreshListener,
    pub session: PaintSession,
    pub writer: WriteCoordinator,
    selected_color: u8,
}

impl SyncEngine {
    /// A fresh engine: blank canvas, color 0 selected, nothing in flight.
    #[must_use]
    pub fn new(spec: GridSpec, confirm_grace: Duration) -> Self {
        Self {
            store: CanvasStore::new(spec),
            listener: RefreshListener::default(),
            session: PaintSession::default(),
            writer: WriteCoordinator::new(confirm_grace),
            selected_color: 0,
        }
    }

    /// The one unconditional refresh, issued before any signal has
    /// arrived, so a quiet feed still produces a first picture. Call once.
    pub fn startup(&mut self) -> Vec<Action> {
        vec![self.start_fetch()]
    }

    /// Triages one relay signal; a distinct one starts or defers a fetch.
    pub fn handle_signal(&mut self, signal: &ChangeSignal) -> Vec<Action> {
        match self.listener.observe(signal) {
            SignalDecision::Refresh => vec![self.start_fetch()],
            SignalDecision::Deferred => {
                debug!(seq = ?signal.seq, "change signal deferred behind in-flight fetch");
                Vec::new()
            }
            SignalDecision::Duplicate => {
                debug!(seq = ?signal.seq, "duplicate change signal ignored");
                Vec::new()
            }
        }
    }

    /// Outcome of the fetch issued for `generation`. Every [`Action::Fetch`]
    /// must be answered by exactly one call here, however the fetch ended.
    pub fn handle_snapshot(
        &mut self,
        generation: u64,
        outcome: Result<String, FetchError>,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        match outcome {
            Ok(encoding) => match self.store.replace_snapshot(&encoding, generation) {
                Ok(snapshot) if snapshot.applied => {
                    for &index in &snapshot.superseded {
                        self.writer.mark_reflected(index);
                    }
                    debug!(generation, superseded = snapshot.superseded.len(), "snapshot applied");
                    actions.push(Action::ViewChanged);
                }
                Ok(_) => {
                    debug!(
                        generation,
                        latest = self.store.issued_generation(),
                        "stale snapshot discarded"
                    );
                }
                Err(err) => {
                    warn!(generation, error = %err, "snapshot rejected by decoder");
                    actions.push(Action::Notify(Notice::RefreshFailed { detail: err.to_string() }));
                }
            },
            Err(err) => {
                warn!(generation, error = %err, "snapshot fetch failed");
                actions.push(Action::Notify(Notice::RefreshFailed { detail: err.to_string() }));
            }
        }
        // Whatever happened, the fetch settled; a signal that arrived in
        // the meantime gets its one follow-up fetch now.
        if self.listener.fetch_settled() {
            actions.push(self.start_fetch());
        }
        actions
    }

    /// Picks the brush color for subsequent pointer events. A color the
    /// palette does not have is ignored.
    pub fn select_color(&mut self, color: u8) -> Vec<Action> {
        if color >= self.store.spec().palette_len {
            warn!(color, "selected color outside palette; keeping previous");
        } else {
            self.selected_color = color;
        }
        Vec::new()
    }

    /// Currently selected brush color.
    #[must_use]
    pub fn selected_color(&self) -> u8 {
        self.selected_color
    }

    /// Pointer pressed on `index`: opens a paint session and writes the
    /// pressed pixel in the selected color.
    pub fn pointer_down(&mut self, index: usize, now: Instant) -> Vec<Action> {
        let intent = self.session.pointer_down(index, self.selected_color);
        self.commit_intent(intent, now)
    }

    /// Pointer crossed into `index`: paints only while a session is open,
    /// in the color selected at this moment.
    pub fn pointer_enter(&mut self, index: usize, now: Instant) -> Vec<Action> {
        match self.session.pointer_enter(index, self.selected_color) {
            Some(intent) => self.commit_intent(intent, now),
            None => Vec::new(),
        }
    }

    /// Pointer released: the gesture ends, pending writes ride on.
    pub fn pointer_up(&mut self) -> Vec<Action> {
        self.session.pointer_up();
        Vec::new()
    }

    /// Pointer left the canvas: same closure as a release.
    pub fn pointer_leave(&mut self) -> Vec<Action> {
        self.session.pointer_leave();
        Vec::new()
    }

    /// Outcome of the contract call for write `id` on `index`.
    pub fn handle_write_ack(
        &mut self,
        index: usize,
        id: WriteId,
        outcome: Result<(), WriteError>,
        now: Instant,
    ) -> Vec<Action> {
        match outcome {
            Ok(()) => {
                if !self.writer.confirm_submitted(index, id, now) {
                    debug!(index, %id, "ack for a superseded write ignored");
                }
                Vec::new()
            }
            Err(err) => {
                if !self.writer.fail(index, id) {
                    debug!(index, %id, "failure of a superseded write ignored");
                    return Vec::new();
                }
                self.store.clear_override(index);
                warn!(index, error = %err, "pixel write rejected; override rolled back");
                vec![
                    Action::ViewChanged,
                    Action::Notify(Notice::WriteRejected { index, detail: err.to_string() }),
                ]
            }
        }
    }

    /// Expires acknowledged writes whose broadcast never came, dropping
    /// their overrides. Call on a steady cadence with the current time.
    pub fn sweep(&mut self, now: Instant) -> Vec<Action> {
        let expired = self.writer.sweep(now);
        if expired.is_empty() {
            return Vec::new();
        }
        for &index in &expired {
            self.store.clear_override(index);
        }
        warn!(pixels = ?expired, "acknowledged writes never reached the canvas; overrides dropped");
        vec![Action::ViewChanged]
    }

    /// The composite canvas for rendering.
    #[must_use]
    pub fn view(&self) -> Grid {
        self.store.view()
    }

    /// Stamps a generation, marks the fetch as underway, and asks the host
    /// to run it.
    fn start_fetch(&mut self) -> Action {
        let generation = self.store.begin_refresh();
        self.listener.fetch_started();
        Action::Fetch { generation }
    }

    /// Applies a write intent: override first, then the submission, so the
    /// optimistic color is visible before any asynchronous work starts.
    fn commit_intent(&mut self, intent: WriteIntent, now: Instant) -> Vec<Action> {
        let WriteIntent { index, color } = intent;
        if !self.store.apply_override(index, color) {
            warn!(index, color, "write intent outside the grid; dropped");
            return Vec::new();
        }
        let handle = self.writer.submit(index, color, now);
        vec![Action::ViewChanged, Action::SubmitWrite { id: handle.id, index, color }]
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
