//! Client-side state synchronization for a shared pixel canvas.
//!
//! This crate keeps one participant's picture of a collaboratively painted
//! canvas honest. The canvas itself lives elsewhere; what arrives here is a
//! compact hex snapshot pulled over HTTP, a stream of change hints pushed
//! over a websocket relay, and the user's own pointer input. The engine
//! reconciles all three: snapshots are guarded by generation so a slow
//! response can never roll the picture back, the user's pending pixels are
//! painted optimistically and survive refreshes until the shared canvas
//! reflects them, and every write travels through an injected
//! [`writer::PixelContract`] so hosts decide how pixels are actually placed.
//!
//! Everything stateful is synchronous and single-threaded; the async
//! [`client`] shell owns one engine per task and feeds it messages. Hosts
//! that bring their own transport can skip [`net`] entirely and drive the
//! [`engine::SyncEngine`] directly.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`client`] | Async client task, command/view/notice plumbing |
//! | [`engine`] | Top-level [`engine::SyncEngine`] tying the parts together |
//! | [`codec`] | Hex canvas encoding and decoding |
//! | [`store`] | Generation-guarded snapshot store with optimistic overrides |
//! | [`listener`] | Change-signal de-duplication and fetch coalescing |
//! | [`session`] | Pointer gesture state machine for paint strokes |
//! | [`writer`] | Pending-write tracking against the injected contract |
//! | [`net`] | HTTP snapshot source and websocket signal feed |
//! | [`consts`] | Shared numeric constants (canvas size, palette, timeouts) |

pub mod client;
pub mod codec;
pub mod consts;
pub mod engine;
pub mod listener;
pub mod net;
pub mod session;
pub mod store;
pub mod writer;
