//! The sync engine.

use crate::backend::SyncBackend;
use crate::error::SyncResult;
use chrono::{DateTime, Utc};
use tempo_core::{Frame, Frames};

/// Orchestrates cursor-based pull and push against one backend.
///
/// The engine owns the in-memory cursor (`last_sync`); loading it from
/// and persisting it to disk is the caller's job. Neither [`pull`] nor
/// [`push`] moves the cursor: the caller advances it explicitly with
/// [`advance_cursor`] once both directions have been confirmed.
///
/// Deleted frames have no representation in either direction; both
/// pull and push only add or overwrite. A frame deleted on one side and
/// untouched on the other reappears after a sync (known limitation).
///
/// [`pull`]: SyncEngine::pull
/// [`push`]: SyncEngine::push
/// [`advance_cursor`]: SyncEngine::advance_cursor
pub struct SyncEngine<B: SyncBackend> {
    backend: B,
    last_sync: DateTime<Utc>,
}

impl<B: SyncBackend> SyncEngine<B> {
    /// Creates an engine over a backend with the persisted cursor.
    pub fn new(backend: B, last_sync: DateTime<Utc>) -> Self {
        Self { backend, last_sync }
    }

    /// The current cursor.
    pub fn cursor(&self) -> DateTime<Utc> {
        self.last_sync
    }

    /// The backend the engine syncs against.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Advances the cursor. Called by the owner after pull and push
    /// both succeeded; the new value is typically the instant the pull
    /// completed.
    pub fn advance_cursor(&mut self, to: DateTime<Utc>) {
        tracing::debug!(from = %self.last_sync, to = %to, "cursor advanced");
        self.last_sync = to;
    }

    /// Pulls remote frames changed since the cursor and applies them to
    /// the local store.
    ///
    /// A frame is applied when its id is unknown locally, or when the
    /// remote `updated_at` is strictly greater than the cursor: remote
    /// wins for anything touched since the last successful sync, with
    /// no field-level merging. Returns the frames actually applied, in
    /// the order received. On a backend error nothing is applied.
    pub fn pull(&mut self, frames: &mut Frames) -> SyncResult<Vec<Frame>> {
        self.backend.begin_sync();

        let cursor = self.last_sync;
        let incoming = self.backend.pull(cursor)?;

        let mut applied = Vec::new();
        for frame in incoming {
            if !frames.contains(&frame.id) || frame.updated_at > cursor {
                frames.insert(frame.clone());
                applied.push(frame);
            }
        }

        tracing::debug!(applied = applied.len(), "pull applied");
        Ok(applied)
    }

    /// Pushes local frames modified inside the sync window.
    ///
    /// The window is `last_sync < updated_at < last_pull`, both bounds
    /// strict, so frames touched exactly at a boundary are never
    /// double-counted. The backend is contacted even when the selection
    /// is empty, keeping the contract uniform. Returns the backend's
    /// report of what was accepted.
    pub fn push(&mut self, frames: &Frames, last_pull: DateTime<Utc>) -> SyncResult<Vec<Frame>> {
        let selected: Vec<Frame> = frames
            .iter()
            .filter(|f| self.last_sync < f.updated_at && f.updated_at < last_pull)
            .cloned()
            .collect();

        tracing::debug!(selected = selected.len(), "push window selected");
        self.backend.push(&selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use proptest::prelude::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn frame(id: &str, project: &str, updated_at: i64) -> Frame {
        Frame::new(id, project, ts(0), ts(60), vec![], Some(ts(updated_at)))
    }

    #[test]
    fn pull_applies_unknown_and_newer_frames() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![
            frame("f1", "remote-wins", 150),
            frame("f2", "brand-new", 150),
        ]);

        let mut frames = Frames::new();
        frames.insert(frame("f1", "local-copy", 150));

        let mut engine = SyncEngine::new(backend, ts(100));
        let applied = engine.pull(&mut frames).unwrap();

        assert_eq!(applied.len(), 2);
        assert_eq!(frames.get("f1").unwrap().project, "remote-wins");
        assert!(frames.contains("f2"));
    }

    #[test]
    fn pull_skips_known_frames_not_newer_than_cursor() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![frame("f1", "remote-copy", 100)]);

        let mut frames = Frames::new();
        frames.insert(frame("f1", "local-copy", 100));

        let mut engine = SyncEngine::new(backend, ts(100));
        let applied = engine.pull(&mut frames).unwrap();

        assert!(applied.is_empty());
        assert_eq!(frames.get("f1").unwrap().project, "local-copy");
    }

    #[test]
    fn repeated_pull_is_idempotent() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![frame("f1", "alpha", 150)]);

        let mut frames = Frames::new();
        let mut engine = SyncEngine::new(backend, ts(100));

        let first = engine.pull(&mut frames).unwrap();
        assert_eq!(first.len(), 1);

        // Cursor advanced after the first cycle, no remote change in
        // between: the second pull applies nothing.
        let before: Vec<Frame> = frames.iter().cloned().collect();
        engine.advance_cursor(ts(200));
        let second = engine.pull(&mut frames).unwrap();
        assert!(second.is_empty());
        let after: Vec<Frame> = frames.iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn pull_does_not_advance_cursor() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![frame("f1", "alpha", 150)]);

        let mut frames = Frames::new();
        let mut engine = SyncEngine::new(backend, ts(100));
        engine.pull(&mut frames).unwrap();

        assert_eq!(engine.cursor(), ts(100));
    }

    #[test]
    fn push_window_is_strict_on_both_bounds() {
        let mut frames = Frames::new();
        frames.insert(frame("f50", "alpha", 50));
        frames.insert(frame("f150", "alpha", 150));
        frames.insert(frame("f200", "alpha", 200));
        frames.insert(frame("f250", "alpha", 250));

        let mut engine = SyncEngine::new(MemoryBackend::new(), ts(100));
        let accepted = engine.push(&frames, ts(200)).unwrap();

        let ids: Vec<&str> = accepted.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f150"]);
    }

    #[test]
    fn push_with_empty_store_still_contacts_backend() {
        let frames = Frames::new();
        let mut engine = SyncEngine::new(MemoryBackend::new(), ts(100));

        let accepted = engine.push(&frames, ts(200)).unwrap();
        assert!(accepted.is_empty());
        assert_eq!(engine.backend().pushed().len(), 1);
    }

    #[test]
    fn unreachable_backend_leaves_store_untouched() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![frame("f1", "alpha", 150)]);
        backend.set_unreachable(true);

        let mut frames = Frames::new();
        frames.insert(frame("f0", "local", 50));
        let snapshot: Vec<Frame> = frames.iter().cloned().collect();

        let mut engine = SyncEngine::new(backend, ts(100));
        let err = engine.pull(&mut frames).unwrap_err();
        assert!(matches!(err, crate::SyncError::BackendUnreachable(_)));

        let after: Vec<Frame> = frames.iter().cloned().collect();
        assert_eq!(snapshot, after);
        assert_eq!(engine.cursor(), ts(100));
    }

    #[test]
    fn pull_begins_a_new_sync_attempt() {
        let mut frames = Frames::new();
        let mut engine = SyncEngine::new(MemoryBackend::new(), ts(0));

        engine.pull(&mut frames).unwrap();
        engine.push(&frames, ts(10)).unwrap();
        engine.pull(&mut frames).unwrap();

        // push shares the attempt started by the preceding pull
        assert_eq!(engine.backend().sync_attempts(), 2);
    }

    proptest! {
        /// A frame is selected for push iff its updated_at lies
        /// strictly between the cursor and the pull instant.
        #[test]
        fn push_window_membership(updated in -1000i64..1000, cursor in -500i64..500, pull in -500i64..500) {
            let mut frames = Frames::new();
            frames.insert(frame("f", "alpha", updated));

            let mut engine = SyncEngine::new(MemoryBackend::new(), ts(cursor));
            let accepted = engine.push(&frames, ts(pull)).unwrap();

            let expected = cursor < updated && updated < pull;
            prop_assert_eq!(accepted.len(), usize::from(expected));
        }
    }
}
