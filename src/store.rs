//! Local canvas state: the authoritative base snapshot plus optimistic
//! overrides painted on top.
//!
//! The base only ever changes wholesale, by installing a decoded snapshot.
//! Refreshes are generation-stamped: [`CanvasStore::begin_refresh`] hands
//! out a ticket, and only a snapshot carrying the latest ticket may land.
//! A slow fetch that finishes after a newer one has been issued is thrown
//! away unread, so the canvas can never move backwards in time.
//!
//! Overrides are single-pixel local edits shown ahead of the authoritative
//! broadcast. They survive refreshes until the base catches up with them,
//! and they are dropped individually when a write fails or expires.

use std::collections::HashMap;

use crate::codec::{self, DecodeError, Grid, GridSpec};

/// What [`CanvasStore::replace_snapshot`] did with an offered snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotOutcome {
    /// Whether the snapshot became the new base. `false` means the
    /// generation was stale and the payload was discarded without being
    /// decoded.
    pub applied: bool,
    /// Overrides dropped because the new base already shows their color,
    /// sorted by pixel index.
    pub superseded: Vec<usize>,
}

/// The client's picture of the shared canvas.
#[derive(Debug)]
pub struct CanvasStore {
    spec: GridSpec,
    base: Grid,
    overrides: HashMap<usize, u8>,
    issued: u64,
    applied: u64,
}

impl CanvasStore {
    /// A blank store: every pixel at color 0, no overrides, no refresh
    /// issued yet.
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        Self {
            base: vec![0; spec.pixel_count()],
            overrides: HashMap::new(),
            issued: 0,
            applied: 0,
            spec,
        }
    }

    /// The canvas shape this store was built for.
    #[must_use]
    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    /// Stamps a new refresh generation. The returned ticket must come back
    /// with the fetched snapshot in [`Self::replace_snapshot`].
    pub fn begin_refresh(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Installs a fetched snapshot as the new base.
    ///
    /// A `generation` that is not the latest issued one means a newer
    /// refresh is already underway; the payload is discarded unread and the
    /// outcome reports `applied: false`. On success, every override whose
    /// color the new base already shows is dropped and reported; the rest
    /// stay painted on top.
    ///
    /// # Errors
    ///
    /// The decode failure, verbatim. The base, the overrides, and the
    /// generation bookkeeping are all left untouched.
    pub fn replace_snapshot(
        &mut self,
        encoding: &str,
        generation: u64,
    ) -> Result<SnapshotOutcome, DecodeError> {
        if generation != self.issued {
            return Ok(SnapshotOutcome { applied: false, superseded: Vec::new() });
        }
        let base = codec::decode(self.spec, encoding)?;
        let mut superseded: Vec<usize> = self
            .overrides
            .iter()
            .filter(|&(&index, &color)| base.get(index) == Some(&color))
            .map(|(&index, _)| index)
            .collect();
        superseded.sort_unstable();
        for index in &superseded {
            self.overrides.remove(index);
        }
        self.base = base;
        self.applied = generation;
        Ok(SnapshotOutcome { applied: true, superseded })
    }

    /// Paints one pixel locally, ahead of the authoritative broadcast.
    /// Returns `false` when the index or color is out of range; nothing is
    /// clamped.
    pub fn apply_override(&mut self, index: usize, color: u8) -> bool {
        if !self.spec.contains(index) || color >= self.spec.palette_len {
            return false;
        }
        self.overrides.insert(index, color);
        true
    }

    /// Removes the override on `index`, restoring the base color there.
    /// Returns whether an override was present.
    pub fn clear_override(&mut self, index: usize) -> bool {
        self.overrides.remove(&index).is_some()
    }

    /// Whether `index` currently carries an override.
    #[must_use]
    pub fn has_override(&self, index: usize) -> bool {
        self.overrides.contains_key(&index)
    }

    /// Number of overrides currently painted on top of the base.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Latest generation handed out by [`Self::begin_refresh`].
    #[must_use]
    pub fn issued_generation(&self) -> u64 {
        self.issued
    }

    /// Generation of the snapshot currently installed as the base; zero
    /// until the first snapshot lands.
    #[must_use]
    pub fn applied_generation(&self) -> u64 {
        self.applied
    }

    /// The composite picture: base snapshot with overrides painted on top.
    /// Always a fresh allocation, never a view into internal state.
    #[must_use]
    pub fn view(&self) -> Grid {
        let mut view = self.base.clone();
        for (&index, &color) in &self.overrides {
            // Overrides are bounds-checked on insert and the base never
            // changes size, so the index is always in range.
            view[index] = color;
        }
        view
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
