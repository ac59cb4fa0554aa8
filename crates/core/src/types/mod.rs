//! Core types for the user directory.
//!
//! This module provides type-safe wrappers for the fields of a directory user.

pub mod email;
pub mod id;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use username::{Username, UsernameError};
