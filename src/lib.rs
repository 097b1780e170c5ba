//! sqlview Core Library
//!
//! Browse any SQLite file one page at a time:
//! - StorageSession opens, commits and exports a single database file
//! - TableNavigator lists tables, pages through rows and searches all columns
//!
//! Rows are read without knowing the schema ahead of time; each cell is a
//! dynamic [`Value`].

pub mod config;
pub mod error;
pub mod navigator;
pub mod storage;
pub mod value;

// Re-export main types
pub use config::Config;
pub use error::{Error, Result};
pub use navigator::{TableNavigator, DEFAULT_PAGE_SIZE};
pub use storage::{Page, Snapshot, StorageSession, VacuumInto};
pub use value::{Row, Value};
