//! The HTTP sync backend.
//!
//! The actual HTTP client is abstracted via [`HttpClient`] so tests can
//! script responses without a network; [`ReqwestClient`] is the
//! production implementation.
//!
//! The remote represents a frame's project by URL while the local model
//! uses names. The bidirectional resolution table is fetched once per
//! sync attempt from the `projects` listing endpoint and cached behind
//! an explicit populated flag; [`SyncBackend::begin_sync`] clears it.

use crate::backend::SyncBackend;
use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tempo_core::{Frame, Settings};

/// Default request timeout for the production HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An HTTP response: status code plus raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// HTTP client abstraction.
///
/// A connection-level failure (DNS, refused, timeout) is an `Err`; any
/// HTTP status, expected or not, is an `Ok` response. The backend maps
/// the former to [`SyncError::BackendUnreachable`] and judges the
/// latter against the protocol's expected status codes.
pub trait HttpClient {
    /// Sends a GET request.
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, String>;

    /// Sends a POST request with a JSON body.
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<HttpResponse, String>;
}

/// Production HTTP client backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Builds a client with the given request timeout. A timed-out
    /// request surfaces as a connection-level failure.
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }

    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: String,
    ) -> Result<HttpResponse, String> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.body(body).send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}

/// A frame as it appears on the wire: the project is a remote URL,
/// `updated_at` may be absent.
#[derive(Debug, Serialize, Deserialize)]
struct WireFrame {
    id: String,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    project: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// One entry of the remote project listing.
#[derive(Debug, Clone, Deserialize)]
struct RemoteProject {
    name: String,
    url: String,
}

/// The per-attempt project resolution table.
#[derive(Debug, Default)]
struct ProjectCache {
    populated: bool,
    entries: Vec<RemoteProject>,
}

impl ProjectCache {
    fn clear(&mut self) {
        self.populated = false;
        self.entries.clear();
    }

    fn name_for(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.url == url)
            .map(|p| p.name.as_str())
    }

    fn url_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.url.as_str())
    }
}

/// Sync backend for the artich.io-style HTTP service.
pub struct ArtichBackend<C: HttpClient = ReqwestClient> {
    url: Option<String>,
    token: Option<String>,
    client: C,
    projects: ProjectCache,
}

impl ArtichBackend<ReqwestClient> {
    /// Builds the production backend from the tracker settings.
    pub fn from_settings(settings: &Settings) -> SyncResult<Self> {
        Ok(Self::with_client(settings, ReqwestClient::new(DEFAULT_TIMEOUT)?))
    }
}

impl<C: HttpClient> ArtichBackend<C> {
    /// Builds a backend over an arbitrary HTTP client.
    pub fn with_client(settings: &Settings, client: C) -> Self {
        Self {
            url: settings.backend.url.clone(),
            token: settings.backend.token.clone(),
            client,
            projects: ProjectCache::default(),
        }
    }

    /// Builds the endpoint and headers for a route, or fails with a
    /// configuration error before any network activity.
    ///
    /// The endpoint root is `{backend_url}/{route}/` with exactly one
    /// trailing slash, whatever slashes the configuration carries.
    fn request_info(&self, route: &str) -> SyncResult<(String, Vec<(String, String)>)> {
        let (url, token) = match (self.url.as_deref(), self.token.as_deref()) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => (url, token),
            _ => {
                return Err(SyncError::Configuration(
                    "you must specify a remote URL (backend.url) and a token (backend.token)"
                        .to_string(),
                ))
            }
        };

        let dest = format!("{}/{}/", url.trim_end_matches('/'), route.trim_matches('/'));
        let headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Token {token}")),
        ];
        Ok((dest, headers))
    }

    /// Fetches the remote project listing, at most once per sync
    /// attempt. A second call is served from the cache.
    fn fetch_projects(&mut self) -> SyncResult<()> {
        if self.projects.populated {
            return Ok(());
        }

        let (dest, headers) = self.request_info("projects")?;
        let response = self
            .client
            .get(&dest, &headers)
            .map_err(SyncError::BackendUnreachable)?;
        if response.status != 200 {
            return Err(SyncError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }

        let entries: Vec<RemoteProject> = serde_json::from_str(&response.body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode project listing: {e}")))?;
        tracing::debug!(projects = entries.len(), "remote project listing fetched");

        self.projects = ProjectCache {
            populated: true,
            entries,
        };
        Ok(())
    }
}

impl<C: HttpClient> SyncBackend for ArtichBackend<C> {
    fn name(&self) -> &str {
        "artich"
    }

    fn begin_sync(&mut self) {
        self.projects.clear();
    }

    fn pull(&mut self, last_sync: DateTime<Utc>) -> SyncResult<Vec<Frame>> {
        let (dest, headers) = self.request_info("frames")?;
        let url = format!("{}?last_sync={}", dest, last_sync.timestamp());

        let response = self
            .client
            .get(&url, &headers)
            .map_err(SyncError::BackendUnreachable)?;
        if response.status != 200 {
            return Err(SyncError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }

        let wire: Vec<WireFrame> = serde_json::from_str(&response.body)
            .map_err(|e| SyncError::Protocol(format!("failed to decode frames: {e}")))?;
        if !wire.is_empty() {
            self.fetch_projects()?;
        }

        let mut frames = Vec::with_capacity(wire.len());
        for frame in wire {
            // The remote references the project by URL; resolve it to
            // the local name through the cached listing.
            let project = self
                .projects
                .name_for(&frame.project)
                .ok_or_else(|| SyncError::InvalidRemoteProject {
                    frame_id: frame.id.clone(),
                })?
                .to_string();
            frames.push(Frame::new(
                frame.id,
                project,
                frame.start,
                frame.stop,
                frame.tags,
                frame.updated_at,
            ));
        }

        tracing::debug!(frames = frames.len(), "pulled from remote");
        Ok(frames)
    }

    fn push(&mut self, frames: &[Frame]) -> SyncResult<Vec<Frame>> {
        let (dest, headers) = self.request_info("frames/bulk")?;
        if !frames.is_empty() {
            self.fetch_projects()?;
        }

        // Validate the whole batch before sending anything: every
        // frame's project must have a remote counterpart.
        let mut to_upload = Vec::with_capacity(frames.len());
        for frame in frames {
            let project = self
                .projects
                .url_for(&frame.project)
                .ok_or_else(|| SyncError::UnknownProject {
                    project: frame.project.clone(),
                    frame_id: frame.id.clone(),
                })?
                .to_string();
            to_upload.push(WireFrame {
                id: frame.id.clone(),
                start: frame.start,
                stop: frame.stop,
                project,
                tags: frame.tags.clone(),
                updated_at: None,
            });
        }

        let body = serde_json::to_string(&to_upload)
            .map_err(|e| SyncError::Protocol(format!("failed to encode push body: {e}")))?;
        let response = self
            .client
            .post(&dest, &headers, body)
            .map_err(SyncError::BackendUnreachable)?;
        if response.status != 201 {
            return Err(SyncError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }

        tracing::debug!(frames = frames.len(), "pushed to remote");
        Ok(frames.to_vec())
    }
}
