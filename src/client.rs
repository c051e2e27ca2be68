//! Async client shell: one task that owns the engine and talks to the
//! world.
//!
//! DESIGN
//! ======
//! The [`SyncEngine`] is single-threaded by construction, so one spawned
//! task owns it outright and everything reaches it as a message: pointer
//! commands on a bounded queue, change signals on the feed channel, fetch
//! and write outcomes on an internal completion queue, and a steady ticker
//! for expiry sweeps. Each engine call returns actions that are performed
//! in order before the next message is taken. Views go out on a watch
//! channel (latest wins, renderers can never fall behind), notices on a
//! bounded queue that drops rather than blocks, and all network work is
//! spawned so the loop itself never awaits I/O.
//!
//! SHUTDOWN
//! ========
//! Dropping the [`ClientHandle`] closes the command queue, which ends the
//! loop; in-flight fetches and writes then find the completion queue gone
//! and evaporate. A closed change-signal feed only disarms its select arm:
//! a client with no relay connection keeps serving pointer traffic against
//! the last known canvas.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::codec::{Grid, GridSpec};
use crate::consts::{
    COMMAND_QUEUE_CAPACITY, COMPLETION_QUEUE_CAPACITY, CONFIRM_GRACE_SECS, NOTICE_QUEUE_CAPACITY,
    SWEEP_INTERVAL_MS,
};
use crate::engine::{Action, Notice, SyncEngine};
use crate::listener::ChangeSignal;
use crate::net::{FetchError, SnapshotSource};
use crate::writer::{PixelContract, WriteError, WriteId};

/// Tuning for one client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Canvas geometry and palette size.
    pub spec: GridSpec,
    /// How long an acknowledged write may wait for its broadcast.
    pub confirm_grace: Duration,
    /// Cadence of expiry sweeps.
    pub sweep_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            spec: GridSpec::default(),
            confirm_grace: Duration::from_secs(CONFIRM_GRACE_SECS),
            sweep_interval: Duration::from_millis(SWEEP_INTERVAL_MS),
        }
    }
}

/// User input, exactly as the rendering surface reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectColor(u8),
    PointerDown(usize),
    PointerEnter(usize),
    PointerUp,
    PointerLeave,
}

/// The embedder's grip on a running client.
pub struct ClientHandle {
    /// Pointer and palette input. Dropping every sender stops the client.
    pub commands: mpsc::Sender<Command>,
    /// Latest composite view; `borrow` is always render-ready.
    pub view: watch::Receiver<Grid>,
    /// User-facing notices. Drained too slowly, new ones are dropped.
    pub notices: mpsc::Receiver<Notice>,
    /// The client task itself, for embedders that want to await shutdown.
    pub task: JoinHandle<()>,
}

impl ClientHandle {
    /// The current composite view without waiting for a change.
    #[must_use]
    pub fn latest_view(&self) -> Grid {
        self.view.borrow().clone()
    }
}

/// Outcome of asynchronous work re-entering the loop.
enum Completion {
    Snapshot { generation: u64, outcome: Result<String, FetchError> },
    WriteAck { index: usize, id: WriteId, outcome: Result<(), WriteError> },
}

/// Spawns a client pulling snapshots from `source`, writing through
/// `contract`, and listening on `signals`. The first snapshot fetch is
/// issued immediately; a quiet feed still yields a first picture.
#[must_use]
pub fn spawn_client(
    config: ClientConfig,
    source: Arc<dyn SnapshotSource>,
    contract: Arc<dyn PixelContract>,
    signals: mpsc::Receiver<ChangeSignal>,
) -> ClientHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (notice_tx, notice_rx) = mpsc::channel(NOTICE_QUEUE_CAPACITY);
    let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_QUEUE_CAPACITY);

    let engine = SyncEngine::new(config.spec, config.confirm_grace);
    let (view_tx, view_rx) = watch::channel(engine.view());

    let runtime = ClientRuntime { engine, source, contract, view_tx, notice_tx, completion_tx };
    let task = tokio::spawn(client_loop(
        runtime,
        command_rx,
        signals,
        completion_rx,
        config.sweep_interval,
    ));

    ClientHandle { commands: command_tx, view: view_rx, notices: notice_rx, task }
}

async fn client_loop(
    mut runtime: ClientRuntime,
    mut commands: mpsc::Receiver<Command>,
    mut signals: mpsc::Receiver<ChangeSignal>,
    mut completions: mpsc::Receiver<Completion>,
    sweep_interval: Duration,
) {
    let mut sweep = tokio::time::interval(sweep_interval);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut feed_open = true;

    let startup = runtime.engine.startup();
    runtime.perform_all(startup);

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    info!("command senders gone; client stopping");
                    return;
                };
                let actions = runtime.apply_command(command);
                runtime.perform_all(actions);
            }
            signal = signals.recv(), if feed_open => {
                match signal {
                    Some(signal) => {
                        let actions = runtime.engine.handle_signal(&signal);
                        runtime.perform_all(actions);
                    }
                    None => {
                        warn!("change-signal feed closed; no further refresh hints");
                        feed_open = false;
                    }
                }
            }
            completion = completions.recv() => {
                // The loop holds a sender clone, so this arm never yields
                // `None` while the loop runs.
                if let Some(completion) = completion {
                    let actions = runtime.apply_completion(completion);
                    runtime.perform_all(actions);
                }
            }
            _ = sweep.tick() => {
                let actions = runtime.engine.sweep(Instant::now());
                runtime.perform_all(actions);
            }
        }
    }
}

/// Everything the loop owns: the engine plus its outbound surfaces.
struct ClientRuntime {
    engine: SyncEngine,
    source: Arc<dyn SnapshotSource>,
    contract: Arc<dyn PixelContract>,
    view_tx: watch::Sender<Grid>,
    notice_tx: mpsc::Sender<Notice>,
    completion_tx: mpsc::Sender<Completion>,
}

impl ClientRuntime {
    fn apply_command(&mut self, command: Command) -> Vec<Action> {
        let now = Instant::now();
        match command {
            Command::SelectColor(color) => self.engine.select_color(color),
            Command::PointerDown(index) => self.engine.pointer_down(index, now),
            Command::PointerEnter(index) => self.engine.pointer_enter(index, now),
            Command::PointerUp => self.engine.pointer_up(),
            Command::PointerLeave => self.engine.pointer_leave(),
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> Vec<Action> {
        match completion {
            Completion::Snapshot { generation, outcome } => {
                self.engine.handle_snapshot(generation, outcome)
            }
            Completion::WriteAck { index, id, outcome } => {
                self.engine.handle_write_ack(index, id, outcome, Instant::now())
            }
        }
    }

    /// Performs actions in the order the engine returned them. Order
    /// carries meaning: an optimistic view goes out before the write that
    /// backs it is even spawned.
    fn perform_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Fetch { generation } => self.spawn_fetch(generation),
            Action::SubmitWrite { id, index, color } => self.spawn_write(id, index, color),
            Action::ViewChanged => self.publish_view(),
            Action::Notify(notice) => self.push_notice(notice),
        }
    }

    fn spawn_fetch(&self, generation: u64) {
        let source = Arc::clone(&self.source);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch().await;
            let completion = Completion::Snapshot { generation, outcome };
            if completions.send(completion).await.is_err() {
                debug!(generation, "client gone before snapshot completion");
            }
        });
    }

    fn spawn_write(&self, id: WriteId, index: usize, color: u8) {
        let contract = Arc::clone(&self.contract);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = contract.request_write(index, color).await;
            let completion = Completion::WriteAck { index, id, outcome };
            if completions.send(completion).await.is_err() {
                debug!(index, "client gone before write completion");
            }
        });
    }

    fn publish_view(&self) {
        if self.view_tx.send(self.engine.view()).is_err() {
            debug!("no view receivers; render channel idle");
        }
    }

    fn push_notice(&self, notice: Notice) {
        match self.notice_tx.try_send(notice) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notice)) => {
                warn!(?notice, "notice queue full; dropping notice");
            }
            Err(mpsc::error::TrySendError::Closed(notice)) => {
                debug!(?notice, "notice receiver gone; dropping notice");
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
