use super::*;

fn text(payload: &str) -> ChangeSignal {
    ChangeSignal { seq: None, payload: payload.to_string() }
}

fn numbered(seq: u64) -> ChangeSignal {
    ChangeSignal { seq: Some(seq), payload: format!("{{\"seq\":{seq}}}") }
}

// =============================================================
// Distinctness by payload
// =============================================================

#[test]
fn first_signal_always_refreshes() {
    let mut listener = RefreshListener::default();
    assert_eq!(listener.observe(&text("changed")), SignalDecision::Refresh);
}

#[test]
fn repeated_payload_is_duplicate() {
    let mut listener = RefreshListener::default();
    listener.observe(&text("changed"));
    assert_eq!(listener.observe(&text("changed")), SignalDecision::Duplicate);
}

#[test]
fn changed_payload_refreshes_again() {
    let mut listener = RefreshListener::default();
    listener.observe(&text("a"));
    assert_eq!(listener.observe(&text("b")), SignalDecision::Refresh);
}

#[test]
fn payload_identity_is_against_the_immediately_preceding_signal() {
    let mut listener = RefreshListener::default();
    assert_eq!(listener.observe(&text("a")), SignalDecision::Refresh);
    assert_eq!(listener.observe(&text("a")), SignalDecision::Duplicate);
    assert_eq!(listener.observe(&text("b")), SignalDecision::Refresh);
    // "a" again differs from "b", so it counts as new.
    assert_eq!(listener.observe(&text("a")), SignalDecision::Refresh);
}

// =============================================================
// Distinctness by sequence number
// =============================================================

#[test]
fn first_numbered_signal_refreshes_even_at_zero() {
    let mut listener = RefreshListener::default();
    assert_eq!(listener.observe(&numbered(0)), SignalDecision::Refresh);
}

#[test]
fn same_sequence_number_is_duplicate() {
    let mut listener = RefreshListener::default();
    listener.observe(&numbered(1));
    assert_eq!(listener.observe(&numbered(1)), SignalDecision::Duplicate);
}

#[test]
fn lower_sequence_number_is_duplicate() {
    let mut listener = RefreshListener::default();
    listener.observe(&numbered(5));
    assert_eq!(listener.observe(&numbered(3)), SignalDecision::Duplicate);
}

#[test]
fn duplicates_do_not_lower_the_watermark() {
    let mut listener = RefreshListener::default();
    listener.observe(&numbered(5));
    listener.observe(&numbered(3));
    // 4 is above the replayed 3 but below the watermark of 5.
    assert_eq!(listener.observe(&numbered(4)), SignalDecision::Duplicate);
    assert_eq!(listener.observe(&numbered(6)), SignalDecision::Refresh);
}

#[test]
fn mixed_feed_falls_back_to_payload_identity() {
    let mut listener = RefreshListener::default();
    assert_eq!(listener.observe(&numbered(1)), SignalDecision::Refresh);
    // An unnumbered signal compares by payload against the previous text.
    assert_eq!(listener.observe(&text("x")), SignalDecision::Refresh);
    assert_eq!(listener.observe(&text("x")), SignalDecision::Duplicate);
    // Sequence numbers keep their own watermark across the gap.
    assert_eq!(listener.observe(&numbered(1)), SignalDecision::Duplicate);
    assert_eq!(listener.observe(&numbered(2)), SignalDecision::Refresh);
}

// =============================================================
// Coalescing around an in-flight fetch
// =============================================================

#[test]
fn distinct_signal_during_flight_is_deferred() {
    let mut listener = RefreshListener::default();
    listener.fetch_started();
    assert_eq!(listener.observe(&text("a")), SignalDecision::Deferred);
    assert!(listener.fetch_settled());
}

#[test]
fn duplicate_during_flight_sets_no_flag() {
    let mut listener = RefreshListener::default();
    listener.observe(&text("a"));
    listener.fetch_started();
    assert_eq!(listener.observe(&text("a")), SignalDecision::Duplicate);
    assert!(!listener.fetch_settled());
}

#[test]
fn many_deferrals_collapse_into_one_follow_up() {
    let mut listener = RefreshListener::default();
    listener.fetch_started();
    assert_eq!(listener.observe(&text("a")), SignalDecision::Deferred);
    assert_eq!(listener.observe(&text("b")), SignalDecision::Deferred);
    assert_eq!(listener.observe(&text("c")), SignalDecision::Deferred);
    assert!(listener.fetch_settled());
    // The follow-up fetch drains the flag; settling it asks for nothing
    // further.
    listener.fetch_started();
    assert!(!listener.fetch_settled());
}

#[test]
fn settle_without_deferrals_requests_nothing() {
    let mut listener = RefreshListener::default();
    listener.fetch_started();
    assert!(!listener.fetch_settled());
    assert!(!listener.fetch_in_flight());
}

#[test]
fn signal_after_settle_refreshes_directly() {
    let mut listener = RefreshListener::default();
    listener.fetch_started();
    listener.fetch_settled();
    assert_eq!(listener.observe(&text("a")), SignalDecision::Refresh);
}

#[test]
fn fetch_in_flight_tracks_lifecycle() {
    let mut listener = RefreshListener::default();
    assert!(!listener.fetch_in_flight());
    listener.fetch_started();
    assert!(listener.fetch_in_flight());
    listener.fetch_settled();
    assert!(!listener.fetch_in_flight());
}
