//! Session storage for the HeartDays auth service.
//!
//! Session state lives in a volatile key-value store with per-key expiry,
//! never in the relational user store. This crate provides:
//!
//! - [`kv`] -- the [`kv::KvStore`] trait (get/set/delete/increment/expire/
//!   keys_matching plus an atomic [`kv::WriteBatch`]) that abstracts the
//!   backing technology.
//! - [`memory`] -- an in-process TTL-aware backend.
//! - [`keys`] -- the key-space constructors.
//! - [`records`] -- the typed records held under each key space.
//! - [`session`] -- [`session::SessionStore`], the only component allowed to
//!   mutate the session key spaces.

pub mod keys;
pub mod kv;
pub mod memory;
pub mod records;
pub mod session;

pub use kv::{KvStore, StoreError, WriteBatch};
pub use memory::MemoryStore;
pub use session::SessionStore;
