//! Settings loaded from the configuration file.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Backend name used when the configuration does not name one.
pub const DEFAULT_BACKEND: &str = "artich";

/// The tracker configuration, read from a TOML file.
///
/// A missing configuration file yields the defaults; a malformed one is
/// fatal and names the offending path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The `[backend]` section.
    pub backend: BackendSettings,
}

/// The `[backend]` section of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Root URL of the remote service.
    pub url: Option<String>,
    /// Authentication token.
    pub token: Option<String>,
    /// Name of the sync backend implementation to use.
    pub name: Option<String>,
}

impl Settings {
    /// Loads settings from the given path.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(CoreError::io(path, e)),
        };

        toml::from_str(&content).map_err(|e| CoreError::invalid_file(path, e.to_string()))
    }

    /// The configured backend name, falling back to [`DEFAULT_BACKEND`].
    pub fn backend_name(&self) -> &str {
        self.backend.name.as_deref().unwrap_or(DEFAULT_BACKEND)
    }
}
