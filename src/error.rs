//! Error types for the storage session and table navigator.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`crate::StorageSession`] and [`crate::TableNavigator`].
///
/// Engine failures are passed through untouched so callers can show the
/// original SQLite message and keep going.
#[derive(Debug, Error)]
pub enum Error {
    /// A data operation was attempted before any file was loaded.
    #[error("no file is loaded")]
    NoFileLoaded,

    /// The table name is not one of the tables discovered in the file.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Page size must be at least one row.
    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// Export destination is the file currently open.
    #[error("cannot export onto the open file: {}", .0.display())]
    ExportOntoSelf(PathBuf),

    /// Requested page lies beyond the largest row offset SQLite accepts.
    #[error("page is out of range")]
    PageOutOfRange,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
