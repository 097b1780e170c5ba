//! Storage module - Owns the SQLite connection and the queries run against it.
//!
//! This module contains:
//! - StorageSession for the open/commit/export lifecycle of one file
//! - Schema discovery and paged, filtered reads used by the navigator

pub mod query;
pub mod session;

pub use query::{Page, SearchFilter};
pub use session::{Snapshot, StorageSession, VacuumInto};
