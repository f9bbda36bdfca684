//! # tempo core
//!
//! Local data model for the tempo time tracker.
//!
//! This crate provides:
//! - The [`Frame`] entity (one recorded, stopped time interval)
//! - The [`Frames`] store (id-keyed, insertion-ordered collection)
//! - The current-session lifecycle ([`SessionState`])
//! - Settings loaded from the configuration file ([`Settings`])
//! - File persistence for frames, session state and the sync cursor
//!   ([`Storage`])
//!
//! ## Key invariants
//!
//! - A frame is always stopped; an in-progress interval lives in the
//!   session state and only becomes a frame when stopped
//! - Frame equality is full field equality, not id equality
//! - Missing or empty state files are empty defaults, never errors;
//!   malformed non-empty files are fatal and name the offending path

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frame;
mod frames;
mod session;
mod settings;
mod storage;

pub use error::{CoreError, CoreResult};
pub use frame::Frame;
pub use frames::Frames;
pub use session::{Session, SessionState};
pub use settings::{BackendSettings, Settings, DEFAULT_BACKEND};
pub use storage::Storage;
