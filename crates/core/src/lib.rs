//! Pivot Journal Core - Shared types library.
//!
//! This crate provides common types used across all Pivot Journal components:
//! - `journal` - Application library (sync engine, autosave, local cache)
//! - `cli` - Command-line client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no async,
//! no backend access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for days, emails, user ids, and statuses
//! - [`prompts`] - The 365-day guided prompt catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod prompts;
pub mod types;

pub use prompts::{
    MONTHLY_THEMES, PROMPT_TEMPLATES, PromptRecord, Theme, catalog, generate_prompts, prompt_for,
};
pub use types::*;
