//! File persistence for frames, session state and the sync cursor.
//!
//! Everything lives in one application directory:
//!
//! - `frames` — JSON array of frames
//! - `state` — JSON object for the current session, `{}` when idle
//! - `last_sync` — JSON number, Unix seconds of the sync cursor
//! - `config` — TOML settings
//!
//! A missing or empty file is the empty default. A malformed non-empty
//! file is fatal and names the offending path. There is no
//! transactionality across files: each save writes one file at a time.

use crate::error::{CoreError, CoreResult};
use crate::frame::Frame;
use crate::frames::Frames;
use crate::session::{Session, SessionState};
use crate::settings::Settings;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const FRAMES_FILE: &str = "frames";
const STATE_FILE: &str = "state";
const LAST_SYNC_FILE: &str = "last_sync";
const CONFIG_FILE: &str = "config";

/// The application directory and the files inside it.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Opens the given directory, creating it if necessary. When `dir`
    /// is `None` the platform configuration directory is used.
    pub fn open(dir: Option<PathBuf>) -> CoreResult<Self> {
        let dir = match dir {
            Some(dir) => dir,
            None => Self::default_dir(),
        };
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// The platform default application directory.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tempo")
    }

    /// The directory backing this storage.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the frames file.
    pub fn frames_file(&self) -> PathBuf {
        self.dir.join(FRAMES_FILE)
    }

    /// Path of the current-session state file.
    pub fn state_file(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Path of the sync cursor file.
    pub fn last_sync_file(&self) -> PathBuf {
        self.dir.join(LAST_SYNC_FILE)
    }

    /// Path of the configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Loads the frame store.
    pub fn load_frames(&self) -> CoreResult<Frames> {
        let frames: Vec<Frame> = read_json(&self.frames_file())?;
        Ok(Frames::from_vec(frames))
    }

    /// Loads a frame set from an arbitrary file, e.g. a conflict file
    /// recovered from a failed sync.
    pub fn load_frames_from(path: &Path) -> CoreResult<Vec<Frame>> {
        read_json(path)
    }

    /// Saves the frame store if it has unsaved mutations.
    pub fn save_frames(&self, frames: &mut Frames) -> CoreResult<()> {
        if !frames.changed() {
            return Ok(());
        }
        write_json(&self.frames_file(), &frames.as_slice())?;
        frames.mark_saved();
        tracing::debug!(count = frames.len(), "frames saved");
        Ok(())
    }

    /// Loads the current session state.
    pub fn load_session(&self) -> CoreResult<SessionState> {
        let raw: StateFile = read_json(&self.state_file())?;
        Ok(SessionState::from_current(raw.into_session()))
    }

    /// Saves the current session state if it changed.
    pub fn save_session(&self, state: &mut SessionState) -> CoreResult<()> {
        if !state.changed() {
            return Ok(());
        }
        match state.current() {
            Some(session) => write_json(&self.state_file(), session)?,
            None => write_json(&self.state_file(), &serde_json::json!({}))?,
        }
        state.mark_saved();
        Ok(())
    }

    /// Loads the sync cursor, defaulting to the Unix epoch when the
    /// tracker has never synced.
    pub fn load_last_sync(&self) -> CoreResult<DateTime<Utc>> {
        let path = self.last_sync_file();
        let secs: Option<i64> = read_json(&path)?;
        match secs {
            None => Ok(DateTime::UNIX_EPOCH),
            Some(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| CoreError::invalid_file(&path, "timestamp out of range")),
        }
    }

    /// Persists the sync cursor as Unix seconds.
    pub fn save_last_sync(&self, cursor: DateTime<Utc>) -> CoreResult<()> {
        write_json(&self.last_sync_file(), &cursor.timestamp())
    }

    /// Loads the settings from the configuration file.
    pub fn load_settings(&self) -> CoreResult<Settings> {
        Settings::load(&self.config_file())
    }
}

/// Raw state-file representation, tolerant of the idle `{}` form.
#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct StateFile {
    project: Option<String>,
    start: Option<DateTime<Utc>>,
    tags: Vec<String>,
}

impl StateFile {
    fn into_session(self) -> Option<Session> {
        match (self.project, self.start) {
            (Some(project), Some(start)) => Some(Session {
                project,
                start,
                tags: self.tags,
            }),
            _ => None,
        }
    }
}

fn read_json<T: Default + DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(CoreError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|e| CoreError::invalid_file(path, e.to_string()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CoreResult<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| CoreError::invalid_file(path, e.to_string()))?;
    std::fs::write(path, content).map_err(|e| CoreError::io(path, e))
}
