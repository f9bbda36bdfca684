//! The sync backend contract and the backend registry.

use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tempo_core::{Frame, Settings};

/// A remote counterpart that frames are pulled from and pushed to.
///
/// This trait abstracts the remote side, allowing different
/// implementations (HTTP, in-memory fake for testing, etc.). One sync
/// attempt is `begin_sync`, then `pull`, then `push`; implementations
/// may cache remote state for the duration of an attempt.
pub trait SyncBackend {
    /// The backend's registered name.
    fn name(&self) -> &str;

    /// Called at the start of each sync attempt. Drops any state
    /// cached from a previous attempt. Default: nothing to drop.
    fn begin_sync(&mut self) {}

    /// Returns every remote frame whose `updated_at` is at or after
    /// `last_sync`. The remote owns the boundary interpretation; the
    /// result is a finite batch consumed once by the caller.
    fn pull(&mut self, last_sync: DateTime<Utc>) -> SyncResult<Vec<Frame>>;

    /// Uploads the given frames and returns the frames actually
    /// accepted. An empty batch is still a valid upload.
    fn push(&mut self, frames: &[Frame]) -> SyncResult<Vec<Frame>>;
}

impl SyncBackend for Box<dyn SyncBackend> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn begin_sync(&mut self) {
        (**self).begin_sync()
    }

    fn pull(&mut self, last_sync: DateTime<Utc>) -> SyncResult<Vec<Frame>> {
        (**self).pull(last_sync)
    }

    fn push(&mut self, frames: &[Frame]) -> SyncResult<Vec<Frame>> {
        (**self).push(frames)
    }
}

/// Factory building a backend from the tracker settings.
pub type BackendFactory = Box<dyn Fn(&Settings) -> SyncResult<Box<dyn SyncBackend>>>;

/// A name-keyed registry of backend factories.
///
/// Plain map lookup, no plugin discovery: backends are registered at
/// startup and resolved by the `backend.name` setting.
#[derive(Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the production backends registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("artich", |settings| {
            Ok(Box::new(crate::http::ArtichBackend::from_settings(
                settings,
            )?))
        });
        registry
    }

    /// Registers a backend factory under a name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Settings) -> SyncResult<Box<dyn SyncBackend>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Returns true if a backend with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds the backend named by the settings.
    ///
    /// An unknown name is a fatal configuration error.
    pub fn create(&self, settings: &Settings) -> SyncResult<Box<dyn SyncBackend>> {
        let name = settings.backend_name();
        let factory = self.factories.get(name).ok_or_else(|| {
            SyncError::Configuration(format!("sync backend '{name}' is not installed"))
        })?;
        factory(settings)
    }
}

/// An in-memory backend for the test suite.
///
/// Pulls are served from a scripted remote frame set; pushes are
/// recorded batch by batch. A connection failure can be injected to
/// exercise the unreachable path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    remote: Vec<Frame>,
    pushed: Vec<Vec<Frame>>,
    unreachable: bool,
    sync_attempts: usize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the scripted remote frame set.
    pub fn set_remote(&mut self, frames: Vec<Frame>) {
        self.remote = frames;
    }

    /// Adds one frame to the scripted remote frame set.
    pub fn add_remote(&mut self, frame: Frame) {
        self.remote.push(frame);
    }

    /// Makes every subsequent call fail with `BackendUnreachable`.
    pub fn set_unreachable(&mut self, unreachable: bool) {
        self.unreachable = unreachable;
    }

    /// Every pushed batch, in push order.
    pub fn pushed(&self) -> &[Vec<Frame>] {
        &self.pushed
    }

    /// Number of sync attempts started against this backend.
    pub fn sync_attempts(&self) -> usize {
        self.sync_attempts
    }

    fn check_reachable(&self) -> SyncResult<()> {
        if self.unreachable {
            Err(SyncError::BackendUnreachable(
                "connection refused".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl SyncBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn begin_sync(&mut self) {
        self.sync_attempts += 1;
    }

    fn pull(&mut self, last_sync: DateTime<Utc>) -> SyncResult<Vec<Frame>> {
        self.check_reachable()?;
        Ok(self
            .remote
            .iter()
            .filter(|f| f.updated_at >= last_sync)
            .cloned()
            .collect())
    }

    fn push(&mut self, frames: &[Frame]) -> SyncResult<Vec<Frame>> {
        self.check_reachable()?;
        self.pushed.push(frames.to_vec());
        Ok(frames.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::BackendSettings;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn frame(id: &str, updated_at: i64) -> Frame {
        Frame::new(id, "alpha", ts(0), ts(60), vec![], Some(ts(updated_at)))
    }

    #[test]
    fn memory_backend_filters_by_cursor() {
        let mut backend = MemoryBackend::new();
        backend.set_remote(vec![frame("f1", 50), frame("f2", 100), frame("f3", 150)]);

        let pulled = backend.pull(ts(100)).unwrap();
        let ids: Vec<&str> = pulled.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f2", "f3"]);
    }

    #[test]
    fn memory_backend_records_pushes() {
        let mut backend = MemoryBackend::new();

        let accepted = backend.push(&[frame("f1", 10)]).unwrap();
        assert_eq!(accepted.len(), 1);
        backend.push(&[]).unwrap();

        assert_eq!(backend.pushed().len(), 2);
        assert!(backend.pushed()[1].is_empty());
    }

    #[test]
    fn memory_backend_unreachable() {
        let mut backend = MemoryBackend::new();
        backend.set_unreachable(true);

        assert!(matches!(
            backend.pull(ts(0)),
            Err(SyncError::BackendUnreachable(_))
        ));
        assert!(matches!(
            backend.push(&[]),
            Err(SyncError::BackendUnreachable(_))
        ));
        assert!(backend.pushed().is_empty());
    }

    #[test]
    fn registry_resolves_by_settings_name() {
        let mut registry = BackendRegistry::new();
        registry.register("memory", |_| Ok(Box::new(MemoryBackend::new())));

        let settings = Settings {
            backend: BackendSettings {
                name: Some("memory".into()),
                ..Default::default()
            },
        };

        let backend = registry.create(&settings).unwrap();
        assert_eq!(backend.name(), "memory");
    }

    #[test]
    fn registry_unknown_name_is_configuration_error() {
        let registry = BackendRegistry::new();
        let settings = Settings::default();

        let err = registry.create(&settings).err().unwrap();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("artich"));
    }

    #[test]
    fn default_registry_has_http_backend() {
        let registry = BackendRegistry::with_defaults();
        assert!(registry.contains("artich"));
    }
}
