//! Pivot Journal application library.
//!
//! A 365-day guided-prompt journal synchronized with a per-user remote
//! document collection. This crate owns the client-side data path:
//!
//! - [`backend`] - ports for the document collection and the auth service,
//!   with in-memory and filesystem implementations
//! - [`services::auth`] - session/identity provider over an auth backend
//! - [`store`] - the entry store: live snapshot merge and the one-time
//!   local-to-remote migration
//! - [`autosave`] - debounced per-day persistence with a save-status machine
//! - [`cache`] - device-local scratch storage and migration source
//! - [`export`] - plain-text journal export
//! - [`app`] - the client context tying a session together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod autosave;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod services;
pub mod store;

pub use app::{JournalApp, SessionError};
pub use config::JournalConfig;
pub use error::SyncError;
