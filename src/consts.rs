//! Shared numeric constants for the pixelboard crate.

// ── Canvas geometry ─────────────────────────────────────────────

/// Pixels per side of the shared canvas. The canvas is always square.
pub const CANVAS_SIDE: usize = 100;

/// Number of palette entries. The wire encoding spends one hex symbol per
/// pixel, so the palette can never grow past sixteen colors.
pub const PALETTE_LEN: u8 = 16;

/// Display colors by palette index, as CSS hex strings. The sync engine
/// never interprets these; they exist for rendering surfaces that turn a
/// palette index into something visible. Index 0 is the blank-canvas color.
pub const PALETTE: [&str; 16] = [
    "#ffffff", "#e4e4e4", "#888888", "#222222", "#ffa7d1", "#e50000",
    "#e59500", "#a06a42", "#e5d900", "#94e044", "#02be01", "#00d3dd",
    "#0083c7", "#0000ea", "#cf6ee4", "#820080",
];

// ── Write confirmation ──────────────────────────────────────────

/// How long an acknowledged write may wait for the broadcast loop to show
/// it before its optimistic override is dropped.
pub const CONFIRM_GRACE_SECS: u64 = 30;

/// Cadence of the sweep that expires overdue acknowledged writes.
pub const SWEEP_INTERVAL_MS: u64 = 1000;

// ── Channel capacities ──────────────────────────────────────────

/// Bounded capacity of the client command queue.
pub const COMMAND_QUEUE_CAPACITY: usize = 64;

/// Bounded capacity of the user-notice queue. When the embedder drains
/// notices too slowly, new ones are dropped rather than blocking the client.
pub const NOTICE_QUEUE_CAPACITY: usize = 32;

/// Bounded capacity of the inbound change-signal queue.
pub const SIGNAL_QUEUE_CAPACITY: usize = 64;

/// Bounded capacity of the internal queue carrying fetch and write
/// completions back into the client loop.
pub const COMPLETION_QUEUE_CAPACITY: usize = 64;
