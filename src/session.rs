//! Paint gesture state: one pointer press-drag-release over the grid.
//!
//! A session opens on pointer-down and closes on release or when the
//! pointer leaves the canvas. Every pixel crossed while the session is
//! open becomes a write intent, de-duplicated per pixel and color so a
//! jittery pointer cannot spam the contract with repeat writes.

use std::collections::HashMap;

/// A pixel the gesture wants painted, in the color captured at the moment
/// the pointer crossed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteIntent {
    pub index: usize,
    pub color: u8,
}

/// Pointer gesture state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintSession {
    /// No button held; hovering paints nothing.
    Idle,
    /// Button held since pointer-down.
    Painting {
        /// Color selected when the session began.
        color: u8,
        /// Pixels painted this session, with the color each one got.
        painted: HashMap<usize, u8>,
    },
}

impl Default for PaintSession {
    fn default() -> Self {
        Self::Idle
    }
}

impl PaintSession {
    /// Opens a session at the pressed pixel and paints it. A press during
    /// an already-open session starts over: new gesture, fresh
    /// de-duplication state.
    pub fn pointer_down(&mut self, index: usize, color: u8) -> WriteIntent {
        let mut painted = HashMap::new();
        painted.insert(index, color);
        *self = Self::Painting { color, painted };
        WriteIntent { index, color }
    }

    /// Paints the entered pixel if a session is open and this pixel has not
    /// already been painted in this color during it. Crossing the same
    /// pixel again with a different selection paints it again.
    pub fn pointer_enter(&mut self, index: usize, color: u8) -> Option<WriteIntent> {
        let Self::Painting { painted, .. } = self else {
            return None;
        };
        if painted.get(&index) == Some(&color) {
            return None;
        }
        painted.insert(index, color);
        Some(WriteIntent { index, color })
    }

    /// Closes the session: the button was released.
    pub fn pointer_up(&mut self) {
        *self = Self::Idle;
    }

    /// Closes the session: the pointer left the canvas. Pixels already
    /// painted stay painted.
    pub fn pointer_leave(&mut self) {
        *self = Self::Idle;
    }

    /// Whether a gesture is currently underway.
    #[must_use]
    pub fn is_painting(&self) -> bool {
        matches!(self, Self::Painting { .. })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
