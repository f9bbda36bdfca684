//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization.
///
/// Nothing in this layer retries: every failure is surfaced to the
/// caller, who decides whether to rerun the whole sync.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Missing or invalid backend configuration. Raised before any
    /// network activity, never retried.
    #[error("backend configuration error: {0}")]
    Configuration(String),

    /// Connection-level failure (DNS, refused, timeout). The local
    /// store is left exactly as before the call.
    #[error("unable to reach the server: {0}")]
    BackendUnreachable(String),

    /// The server answered with a status the protocol does not expect.
    /// Carries the server's response body.
    #[error("unexpected response from the server ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status code received.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A payload could not be encoded or a remote payload could not be
    /// decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A pulled frame references a project URL absent from the remote
    /// project listing.
    #[error("received frame with invalid project from the server (id: {frame_id})")]
    InvalidRemoteProject {
        /// Id of the offending frame.
        frame_id: String,
    },

    /// A frame selected for push references a project with no remote
    /// counterpart. Raised during pre-send validation, before any
    /// request goes out.
    #[error(
        "the project {project} does not exist on the remote server, \
         please create it or edit the frame (id: {frame_id})"
    )]
    UnknownProject {
        /// Local project name with no remote counterpart.
        project: String,
        /// Id of the offending frame.
        frame_id: String,
    },

    /// Propagated failure from the local data layer.
    #[error(transparent)]
    Core(#[from] tempo_core::CoreError),
}

impl SyncError {
    /// Returns true if the error was reported by (or about) the remote.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::UnexpectedStatus { .. }
                | SyncError::Protocol(_)
                | SyncError::InvalidRemoteProject { .. }
                | SyncError::UnknownProject { .. }
        )
    }
}
