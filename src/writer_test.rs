use super::*;

const GRACE: Duration = Duration::from_secs(30);

fn coordinator() -> WriteCoordinator {
    WriteCoordinator::new(GRACE)
}

// =============================================================
// Submission and supersession
// =============================================================

#[test]
fn submit_returns_a_handle_echoing_the_write() {
    let mut writer = coordinator();
    let handle = writer.submit(4, 7, Instant::now());
    assert_eq!(handle.index, 4);
    assert_eq!(handle.color, 7);
    assert_eq!(writer.pending_count(), 1);
}

#[test]
fn each_attempt_gets_a_fresh_id() {
    let mut writer = coordinator();
    let a = writer.submit(1, 1, Instant::now());
    let b = writer.submit(2, 1, Instant::now());
    assert_ne!(a.id, b.id);
}

#[test]
fn resubmit_supersedes_the_same_pixel() {
    let mut writer = coordinator();
    let now = Instant::now();
    let first = writer.submit(4, 1, now);
    let second = writer.submit(4, 2, now);

    assert_eq!(writer.pending_count(), 1);
    let pending = writer.pending_write(4).unwrap();
    assert_eq!(pending.id, second.id);
    assert_eq!(pending.color, 2);
    // The superseded attempt can no longer be acknowledged.
    assert!(!writer.confirm_submitted(4, first.id, now));
}

#[test]
fn writes_on_different_pixels_are_independent() {
    let mut writer = coordinator();
    let now = Instant::now();
    writer.submit(1, 1, now);
    writer.submit(2, 2, now);
    assert_eq!(writer.pending_count(), 2);
}

// =============================================================
// Acknowledgement and failure
// =============================================================

#[test]
fn confirm_moves_the_write_to_awaiting_broadcast() {
    let mut writer = coordinator();
    let now = Instant::now();
    let handle = writer.submit(4, 7, now);

    assert!(writer.confirm_submitted(4, handle.id, now));
    let pending = writer.pending_write(4).unwrap();
    assert!(matches!(pending.state, WriteState::AwaitingBroadcast { .. }));
}

#[test]
fn confirm_on_an_unknown_pixel_is_ignored() {
    let mut writer = coordinator();
    assert!(!writer.confirm_submitted(9, Uuid::new_v4(), Instant::now()));
}

#[test]
fn fail_drops_the_current_write() {
    let mut writer = coordinator();
    let handle = writer.submit(4, 7, Instant::now());
    assert!(writer.fail(4, handle.id));
    assert_eq!(writer.pending_count(), 0);
}

#[test]
fn fail_with_a_superseded_id_keeps_the_current_write() {
    let mut writer = coordinator();
    let now = Instant::now();
    let first = writer.submit(4, 1, now);
    let second = writer.submit(4, 2, now);

    assert!(!writer.fail(4, first.id));
    assert_eq!(writer.pending_write(4).unwrap().id, second.id);
}

#[test]
fn mark_reflected_clears_the_pixel_in_any_state() {
    let mut writer = coordinator();
    let now = Instant::now();
    let acked = writer.submit(1, 1, now);
    writer.confirm_submitted(1, acked.id, now);
    writer.submit(2, 2, now);

    assert!(writer.mark_reflected(1));
    assert!(writer.mark_reflected(2));
    assert!(!writer.mark_reflected(3));
    assert_eq!(writer.pending_count(), 0);
}

// =============================================================
// Expiry sweep
// =============================================================

#[test]
fn sweep_never_expires_unacknowledged_writes() {
    let mut writer = coordinator();
    let now = Instant::now();
    writer.submit(4, 7, now);
    // Hours later the wallet prompt may still be open.
    assert!(writer.sweep(now + Duration::from_secs(3600)).is_empty());
    assert_eq!(writer.pending_count(), 1);
}

#[test]
fn sweep_expires_acknowledged_writes_past_the_grace() {
    let mut writer = coordinator();
    let now = Instant::now();
    let handle = writer.submit(4, 7, now);
    writer.confirm_submitted(4, handle.id, now);

    assert_eq!(writer.sweep(now + GRACE), vec![4]);
    assert_eq!(writer.pending_count(), 0);
}

#[test]
fn sweep_keeps_acknowledged_writes_within_the_grace() {
    let mut writer = coordinator();
    let now = Instant::now();
    let handle = writer.submit(4, 7, now);
    writer.confirm_submitted(4, handle.id, now);

    assert!(writer.sweep(now + GRACE - Duration::from_secs(1)).is_empty());
    assert_eq!(writer.pending_count(), 1);
}

#[test]
fn sweep_measures_from_the_acknowledgement_not_the_submission() {
    let mut writer = coordinator();
    let submitted = Instant::now();
    let handle = writer.submit(4, 7, submitted);
    // The wallet took a while; the grace starts at the ack.
    let acked = submitted + Duration::from_secs(120);
    writer.confirm_submitted(4, handle.id, acked);

    assert!(writer.sweep(acked + GRACE - Duration::from_secs(1)).is_empty());
    assert_eq!(writer.sweep(acked + GRACE), vec![4]);
}

#[test]
fn sweep_reports_expired_pixels_sorted() {
    let mut writer = coordinator();
    let now = Instant::now();
    for index in [9, 2, 5] {
        let handle = writer.submit(index, 1, now);
        writer.confirm_submitted(index, handle.id, now);
    }
    assert_eq!(writer.sweep(now + GRACE), vec![2, 5, 9]);
}

#[test]
fn sweep_leaves_fresh_and_unacked_writes_alone() {
    let mut writer = coordinator();
    let now = Instant::now();

    writer.submit(1, 1, now); // never acked
    let stale = writer.submit(2, 2, now);
    writer.confirm_submitted(2, stale.id, now);
    let fresh = writer.submit(3, 3, now);
    writer.confirm_submitted(3, fresh.id, now + GRACE);

    assert_eq!(writer.sweep(now + GRACE), vec![2]);
    assert_eq!(writer.pending_count(), 2);
}
