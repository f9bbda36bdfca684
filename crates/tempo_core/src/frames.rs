//! The frame store.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use std::collections::HashMap;

/// An id-keyed collection of frames.
///
/// Insertion order is preserved so iteration is deterministic; an
/// overwrite keeps the original slot. The store carries a `changed`
/// flag so the storage layer can skip no-op writes.
#[derive(Debug, Default)]
pub struct Frames {
    frames: Vec<Frame>,
    index: HashMap<String, usize>,
    changed: bool,
}

impl Frames {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded frames. Later duplicates of an id
    /// overwrite earlier ones. The store starts clean.
    pub fn from_vec(frames: Vec<Frame>) -> Self {
        let mut store = Self::new();
        for frame in frames {
            store.insert(frame);
        }
        store.changed = false;
        store
    }

    /// Number of frames in the store.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the store holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Membership test by id.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Looks up a frame by id.
    pub fn find(&self, id: &str) -> Option<&Frame> {
        self.index.get(id).map(|&slot| &self.frames[slot])
    }

    /// Looks up a frame by id, failing when absent.
    pub fn get(&self, id: &str) -> CoreResult<&Frame> {
        self.find(id)
            .ok_or_else(|| CoreError::FrameNotFound(id.to_string()))
    }

    /// Inserts a frame, overwriting any frame with the same id in place.
    pub fn insert(&mut self, frame: Frame) {
        match self.index.get(&frame.id) {
            Some(&slot) => self.frames[slot] = frame,
            None => {
                self.index.insert(frame.id.clone(), self.frames.len());
                self.frames.push(frame);
            }
        }
        self.changed = true;
    }

    /// Iterates frames in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// All frames as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns true if the store has unsaved mutations.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Clears the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// All project names, sorted, without duplicates.
    pub fn projects(&self) -> Vec<String> {
        let mut names: Vec<String> = self.frames.iter().map(|f| f.project.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// All tags across every frame, sorted, without duplicates.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .frames
            .iter()
            .flat_map(|f| f.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}
