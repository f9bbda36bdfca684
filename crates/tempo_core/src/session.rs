//! The current in-progress session.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The interval currently being tracked.
///
/// A session has no stop instant and is never part of the synchronized
/// set; it becomes a [`Frame`] when stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Project being tracked.
    pub project: String,
    /// When tracking started.
    pub start: DateTime<Utc>,
    /// Labels to attach to the resulting frame.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Lifecycle of the current session, with a dirty flag for the storage
/// layer.
#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<Session>,
    changed: bool,
}

impl SessionState {
    /// Creates an idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a state loaded from disk. The state starts clean.
    pub fn from_current(current: Option<Session>) -> Self {
        Self {
            current,
            changed: false,
        }
    }

    /// Returns true if a project is being tracked.
    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// The running session, if any.
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Returns true if the state has unsaved mutations.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Clears the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// Starts tracking a project now.
    pub fn start(&mut self, project: impl Into<String>, tags: Vec<String>) -> CoreResult<&Session> {
        self.start_at(project, tags, Utc::now())
    }

    /// Starts tracking a project at the given instant.
    pub fn start_at(
        &mut self,
        project: impl Into<String>,
        tags: Vec<String>,
        start: DateTime<Utc>,
    ) -> CoreResult<&Session> {
        let project = project.into();
        if project.is_empty() {
            return Err(CoreError::EmptyProject);
        }
        if let Some(session) = &self.current {
            return Err(CoreError::AlreadyStarted(session.project.clone()));
        }

        self.current = Some(Session {
            project,
            start,
            tags,
        });
        self.changed = true;
        Ok(self.current.as_ref().unwrap())
    }

    /// Stops the session now, minting a new frame.
    pub fn stop(&mut self) -> CoreResult<Frame> {
        self.stop_at(Utc::now())
    }

    /// Stops the session at the given instant, minting a new frame.
    ///
    /// The caller is responsible for inserting the frame into the store.
    pub fn stop_at(&mut self, stop: DateTime<Utc>) -> CoreResult<Frame> {
        let session = self.current.take().ok_or(CoreError::NotStarted)?;
        self.changed = true;
        Ok(Frame::create(
            session.project,
            session.start,
            stop,
            session.tags,
        ))
    }

    /// Discards the session without recording a frame.
    pub fn cancel(&mut self) -> CoreResult<Session> {
        let session = self.current.take().ok_or(CoreError::NotStarted)?;
        self.changed = true;
        Ok(session)
    }
}
