//! StorageSession - owns the connection to the currently open SQLite file.
//!
//! Exactly one connection is open at a time. Loading another file closes the
//! previous connection first; exporting never disturbs the open file.

use crate::error::{Error, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Strategy used by [`StorageSession::save_as_new_file`] to write a full copy
/// of the open database to another path.
pub trait Snapshot {
    fn snapshot(&self, conn: &Connection, dest: &Path) -> Result<()>;
}

/// Engine-level export via `VACUUM INTO`.
///
/// Fails when the destination already exists or the engine is too old to
/// support it; the session then falls back to a plain file copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct VacuumInto;

impl Snapshot for VacuumInto {
    fn snapshot(&self, conn: &Connection, dest: &Path) -> Result<()> {
        let dest = dest.to_str().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("destination is not valid UTF-8: {}", dest.display()),
            )
        })?;
        conn.execute("VACUUM INTO ?1", [dest])?;
        Ok(())
    }
}

/// Whether `a` and `b` name the same file on disk, through any spelling,
/// symlink or hard link.
fn is_same_file(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (std::fs::metadata(a), std::fs::metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta_a.dev() == meta_b.dev() && meta_a.ino() == meta_b.ino()
    }

    #[cfg(not(unix))]
    {
        let _ = (meta_a, meta_b);
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Connection lifecycle for one SQLite file at a time.
pub struct StorageSession {
    file_path: Option<PathBuf>,
    conn: Option<Connection>,
    snapshot: Box<dyn Snapshot>,
}

impl Default for StorageSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageSession {
    /// Create a session with nothing loaded.
    pub fn new() -> Self {
        Self::with_snapshot(VacuumInto)
    }

    /// Create a session that exports with a custom snapshot strategy.
    pub fn with_snapshot(snapshot: impl Snapshot + 'static) -> Self {
        Self {
            file_path: None,
            conn: None,
            snapshot: Box::new(snapshot),
        }
    }

    /// Open `path`, closing the current connection first.
    ///
    /// A missing file is created empty by SQLite. Uncommitted work on the
    /// previous connection is rolled back, not saved.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(conn) = self.conn.take() {
            self.file_path = None;
            conn.close().map_err(|(_, e)| e)?;
        }

        let conn = Connection::open(path)?;
        info!("[session] Opened {}", path.display());

        self.conn = Some(conn);
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Commit pending changes on the open connection.
    pub fn save_file(&self) -> Result<()> {
        let conn = self.connection()?;
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
            info!("[session] Committed pending changes");
        }
        Ok(())
    }

    /// Commit, then write a full copy of the database to `new_path`.
    ///
    /// The open file and its connection stay in place. If the snapshot
    /// strategy fails, the connection is closed, the file copied byte for
    /// byte and the original reopened. Exporting onto the open file itself
    /// is refused with [`Error::ExportOntoSelf`].
    pub fn save_as_new_file(&mut self, new_path: impl AsRef<Path>) -> Result<()> {
        let new_path = new_path.as_ref();
        self.save_file()?;

        let path = self.file_path.clone().ok_or(Error::NoFileLoaded)?;
        if is_same_file(&path, new_path) {
            return Err(Error::ExportOntoSelf(new_path.to_path_buf()));
        }
        let conn = self.connection()?;

        match self.snapshot.snapshot(conn, new_path) {
            Ok(()) => {
                info!("[session] Exported {} to {}", path.display(), new_path.display());
                Ok(())
            }
            Err(e) => {
                warn!(
                    "[session] Snapshot into {} failed ({}), copying file instead",
                    new_path.display(),
                    e
                );
                self.copy_and_reopen(&path, new_path)
            }
        }
    }

    fn copy_and_reopen(&mut self, path: &Path, new_path: &Path) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                warn!("[session] Closing before copy reported: {}", e);
            }
        }

        let copied = std::fs::copy(path, new_path);

        // Reopen regardless of the copy outcome so the session stays usable.
        self.conn = Some(Connection::open(path)?);
        copied?;

        info!("[session] Copied {} to {}", path.display(), new_path.display());
        Ok(())
    }

    /// Start an explicit transaction; changes stay pending until
    /// [`save_file`](Self::save_file).
    pub fn begin(&self) -> Result<()> {
        self.connection()?.execute_batch("BEGIN")?;
        Ok(())
    }

    /// Run one or more SQL statements on the open connection.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }

    /// The open connection, or [`Error::NoFileLoaded`].
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NoFileLoaded)
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.conn.is_some()
    }
}
