//! Change-signal triage: deciding which relay notifications deserve a
//! snapshot fetch.
//!
//! The relay's broadcast is a hint, not a diff — every accepted hint leads
//! to a full-canvas pull. Two things keep that cheap. Duplicate detection:
//! a signal that carries nothing new (same payload, or a sequence number
//! that has not advanced) is ignored outright. Coalescing: while a fetch is
//! in flight, any number of further distinct signals collapse into a single
//! trailing flag, and exactly one follow-up fetch runs once the in-flight
//! one settles. A burst of N signals therefore costs at most two fetches.

/// One notification from the relay that the shared canvas changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSignal {
    /// Monotonic sequence number, when the relay provides one.
    pub seq: Option<u64>,
    /// Raw message text, kept for identity comparison when `seq` is absent.
    pub payload: String,
}

/// What [`RefreshListener::observe`] decided about a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDecision {
    /// Distinct signal, nothing in flight: start a fetch now.
    Refresh,
    /// Distinct signal during an in-flight fetch: one follow-up fetch will
    /// run once the current fetch settles.
    Deferred,
    /// Nothing new; ignore it.
    Duplicate,
}

/// The triage state machine. Pure bookkeeping — the caller starts fetches
/// and reports their lifecycle through [`Self::fetch_started`] and
/// [`Self::fetch_settled`].
#[derive(Debug, Default)]
pub struct RefreshListener {
    last_seq: Option<u64>,
    last_payload: Option<String>,
    in_flight: bool,
    trailing: bool,
}

impl RefreshListener {
    /// Classifies one signal. The first signal ever observed is always
    /// distinct.
    pub fn observe(&mut self, signal: &ChangeSignal) -> SignalDecision {
        let distinct = self.is_distinct(signal);
        if distinct {
            if let Some(seq) = signal.seq {
                self.last_seq = Some(seq);
            }
        }
        // Payload identity always compares against the immediately
        // preceding signal, duplicates included.
        self.last_payload = Some(signal.payload.clone());

        if !distinct {
            return SignalDecision::Duplicate;
        }
        if self.in_flight {
            self.trailing = true;
            SignalDecision::Deferred
        } else {
            SignalDecision::Refresh
        }
    }

    /// Marks a fetch as underway. Also used for the unconditional startup
    /// refresh, which no signal announces.
    pub fn fetch_started(&mut self) {
        self.in_flight = true;
    }

    /// Marks the in-flight fetch finished, however it ended. Returns `true`
    /// when distinct signals arrived in the meantime and exactly one
    /// follow-up fetch should start now.
    pub fn fetch_settled(&mut self) -> bool {
        self.in_flight = false;
        let follow_up = self.trailing;
        self.trailing = false;
        follow_up
    }

    /// Whether a fetch is currently outstanding.
    #[must_use]
    pub fn fetch_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Sequence numbers advance strictly; payloads compare by identity
    /// against the previous signal.
    fn is_distinct(&self, signal: &ChangeSignal) -> bool {
        if let Some(seq) = signal.seq {
            return match self.last_seq {
                Some(prev) => seq > prev,
                None => true,
            };
        }
        self.last_payload.as_deref() != Some(signal.payload.as_str())
    }
}

#[cfg(test)]
#[path = "listener_test.rs"]
mod listener_test;
