//! Core types for Pivot Journal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod day;
pub mod email;
pub mod id;
pub mod session;
pub mod status;

pub use day::{Day, DayError};
pub use email::{Email, EmailError};
pub use id::UserId;
pub use session::UserSession;
pub use status::SaveStatus;
