//! Integration tests for the sync engine over the in-memory backend.

use chrono::{DateTime, Utc};
use tempo_core::{Frame, Frames};
use tempo_sync::{merge_report, MemoryBackend, SyncEngine, SyncError};

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn frame(id: &str, project: &str, updated_at: i64) -> Frame {
    Frame::new(id, project, ts(0), ts(60), vec![], Some(ts(updated_at)))
}

#[test]
fn full_sync_cycle() {
    let mut backend = MemoryBackend::new();
    backend.set_remote(vec![frame("r1", "alpha", 150), frame("r2", "beta", 180)]);

    let mut frames = Frames::new();
    frames.insert(frame("l1", "alpha", 120)); // changed since last sync
    frames.insert(frame("l2", "alpha", 80)); // older than the cursor

    let mut engine = SyncEngine::new(backend, ts(100));

    // Pull: both remote frames are new locally.
    let pulled = engine.pull(&mut frames).unwrap();
    assert_eq!(pulled.len(), 2);
    assert_eq!(frames.len(), 4);

    // Push with the pull instant as the window end: only l1 falls in
    // (100, 200). The pulled frames carry updated_at inside the window
    // too, so they are echoed back; the remote recognizes them by id.
    let last_pull = ts(200);
    let pushed = engine.push(&frames, last_pull).unwrap();
    let mut ids: Vec<&str> = pushed.iter().map(|f| f.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["l1", "r1", "r2"]);

    // The cursor only moves when the caller says so.
    assert_eq!(engine.cursor(), ts(100));
    engine.advance_cursor(last_pull);
    assert_eq!(engine.cursor(), ts(200));
}

#[test]
fn second_cycle_after_cursor_advance_is_quiet() {
    let mut backend = MemoryBackend::new();
    backend.set_remote(vec![frame("r1", "alpha", 150)]);

    let mut frames = Frames::new();
    let mut engine = SyncEngine::new(backend, ts(100));

    let pulled = engine.pull(&mut frames).unwrap();
    assert_eq!(pulled.len(), 1);
    engine.push(&frames, ts(200)).unwrap();
    engine.advance_cursor(ts(200));

    let pulled = engine.pull(&mut frames).unwrap();
    assert!(pulled.is_empty());
    let pushed = engine.push(&frames, ts(300)).unwrap();
    assert!(pushed.is_empty());
}

#[test]
fn unreachable_backend_aborts_without_local_changes() {
    let mut backend = MemoryBackend::new();
    backend.set_remote(vec![frame("r1", "alpha", 150)]);
    backend.set_unreachable(true);

    let mut frames = Frames::new();
    frames.insert(frame("l1", "alpha", 120));
    let snapshot: Vec<Frame> = frames.iter().cloned().collect();

    let mut engine = SyncEngine::new(backend, ts(100));
    assert!(matches!(
        engine.pull(&mut frames),
        Err(SyncError::BackendUnreachable(_))
    ));

    let after: Vec<Frame> = frames.iter().cloned().collect();
    assert_eq!(snapshot, after);
    assert_eq!(engine.cursor(), ts(100));
}

#[test]
fn merge_recovers_a_failed_sync() {
    // Local store as it stands after the failed attempt.
    let mut frames = Frames::new();
    frames.insert(frame("1", "A", 100));
    frames.insert(frame("5", "E", 100));

    // Conflict set recovered from storage: one divergent copy, one
    // unseen frame, one already reconciled.
    let conflict_set = vec![frame("1", "B", 100), frame("2", "C", 100), frame("5", "E", 100)];

    let report = merge_report(&frames, &conflict_set);
    assert_eq!(report.conflicting.len(), 1);
    assert_eq!(report.conflicting[0].id, "1");
    assert_eq!(report.merging.len(), 1);
    assert_eq!(report.merging[0].id, "2");

    // Applying the mergeable half is the caller's move.
    for frame in report.merging {
        frames.insert(frame);
    }
    assert!(frames.contains("2"));
    assert_eq!(frames.get("1").unwrap().project, "A");
}
