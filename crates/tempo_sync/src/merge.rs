//! Classification of an externally supplied frame set against the
//! local store.
//!
//! Typical source of such a set: frames recovered from a failed or
//! partial sync, loaded back from a conflict file.

use tempo_core::{Frame, Frames};

/// Outcome of comparing a conflict set against the local store.
///
/// Every frame of the conflict set lands in exactly one of three
/// places: `conflicting`, `merging`, or nowhere (silently dropped
/// because an identical local copy already exists). Both lists keep
/// the input order of the conflict set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Frames whose id exists locally with different field values.
    /// Resolving these (e.g. interactively) is the caller's business.
    pub conflicting: Vec<Frame>,
    /// Frames unknown to the local store, safe to insert.
    pub merging: Vec<Frame>,
}

/// Classifies each frame of `conflict_set` against the local store.
///
/// Pure function: no mutation of either input. A frame conflicts when
/// a local frame with the same id exists and is not field-equal; it is
/// mergeable when no local frame has its id; it is dropped when the
/// local copy is identical (already reconciled).
pub fn merge_report(frames: &Frames, conflict_set: &[Frame]) -> MergeReport {
    let mut report = MergeReport::default();

    for candidate in conflict_set {
        match frames.find(&candidate.id) {
            Some(local) if local == candidate => {}
            Some(_) => report.conflicting.push(candidate.clone()),
            None => report.merging.push(candidate.clone()),
        }
    }

    report
}
