//! # tempo sync
//!
//! Synchronization engine and remote backends for the tempo time
//! tracker.
//!
//! This crate provides:
//! - The [`SyncBackend`] contract and a name-keyed [`BackendRegistry`]
//! - The HTTP backend ([`ArtichBackend`]) with its [`HttpClient`]
//!   abstraction
//! - The [`SyncEngine`] orchestrating cursor-based pull and push
//! - The merge resolver ([`merge_report`]) for externally supplied
//!   frame sets
//!
//! ## Architecture
//!
//! Synchronization is **pull-then-push**:
//! 1. Pull remote frames changed since the cursor and apply them
//!    locally (remote wins for anything touched since the last sync)
//! 2. Push local frames modified inside the sync window
//! 3. Advance the cursor explicitly once both directions succeeded
//!
//! ## Key invariants
//!
//! - The cursor never moves as a side effect of pull or push
//! - A push batch is validated in full before any request is sent
//! - A failed operation leaves the local store untouched
//! - Deleted frames have no representation in either direction; both
//!   directions only add or overwrite (known limitation)

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod engine;
mod error;
mod http;
mod merge;

pub use backend::{BackendRegistry, MemoryBackend, SyncBackend};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use http::{ArtichBackend, HttpClient, HttpResponse, ReqwestClient, DEFAULT_TIMEOUT};
pub use merge::{merge_report, MergeReport};
