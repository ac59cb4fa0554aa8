//! Domain models for the user directory.

pub mod user;

pub use user::{CreateUsers, NewUser, PayloadError, User, UserChanges};
