//! Shared domain types for the HeartDays auth service.
//!
//! - [`error`] -- the auth error taxonomy with stable machine codes.
//! - [`types`] -- id and timestamp aliases.
//! - [`roles`] -- well-known role names.
//! - [`device`] -- device-fingerprint parsing from user-agent strings.
//! - [`directory`] -- the read-mostly user-store collaborator seam.

pub mod device;
pub mod directory;
pub mod error;
pub mod roles;
pub mod types;
