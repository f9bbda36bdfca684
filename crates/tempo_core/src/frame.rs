//! The frame entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded, stopped time interval.
///
/// A frame is always stopped: the in-progress interval lives in
/// [`SessionState`](crate::SessionState) and only becomes a frame once
/// stopped, so every frame in the store is eligible for synchronization.
///
/// Two frames are equal only if every field matches. The merge resolver
/// relies on full field equality, not id equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FrameRepr")]
pub struct Frame {
    /// Opaque identifier, globally unique across local and remote stores.
    /// Generated locally on creation, preserved through sync.
    pub id: String,
    /// Project name.
    pub project: String,
    /// Start of the interval.
    pub start: DateTime<Utc>,
    /// End of the interval, at or after `start`.
    pub stop: DateTime<Utc>,
    /// Labels, duplicates collapsed, order preserved for display.
    pub tags: Vec<String>,
    /// Instant of the last local mutation. Drives sync decisions only.
    pub updated_at: DateTime<Utc>,
}

impl Frame {
    /// Builds a frame from explicit parts.
    ///
    /// Duplicate tags collapse, keeping the first occurrence. A missing
    /// `updated_at` is taken to be the stop instant.
    pub fn new(
        id: impl Into<String>,
        project: impl Into<String>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        tags: Vec<String>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            project: project.into(),
            start,
            stop,
            tags: dedup_tags(tags),
            updated_at: updated_at.unwrap_or(stop),
        }
    }

    /// Mints a brand new frame with a generated id, stamped now.
    ///
    /// Used when the current session stops.
    pub fn create(
        project: impl Into<String>,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        tags: Vec<String>,
    ) -> Self {
        Self::new(
            Uuid::new_v4().simple().to_string(),
            project,
            start,
            stop,
            tags,
            Some(Utc::now()),
        )
    }

    /// Returns a copy with `updated_at` set to the given instant.
    ///
    /// Edit paths must call this so the sync window sees the mutation.
    pub fn touched(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = at;
        self
    }
}

/// Collapses duplicate tags, first occurrence wins, order preserved.
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Raw serde representation, tolerant of an absent `updated_at`.
#[derive(Deserialize)]
struct FrameRepr {
    id: String,
    project: String,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<FrameRepr> for Frame {
    fn from(raw: FrameRepr) -> Self {
        Frame::new(
            raw.id,
            raw.project,
            raw.start,
            raw.stop,
            raw.tags,
            raw.updated_at,
        )
    }
}
