//! Embedded SQLite backend.

pub mod migrations;
pub mod schema;
pub mod tasks;

use crate::error::StoreResult;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Database handle wrapping a SQLite connection.
///
/// Constructed explicitly and handed to callers rather than held as
/// process-global state: one handle per app, one per test. Clones
/// share the underlying connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path and bring its
    /// schema up to date.
    ///
    /// Migration runs on every open and is idempotent; a failed step is
    /// logged and skipped, never fatal (see [`migrations`]).
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // WAL keeps readers unblocked during writes; the busy timeout
        // covers a second handle on the same file.
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate();

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate();

        Ok(db)
    }

    /// Close the handle. The connection is flushed and released when
    /// this is the last clone; otherwise the handle is simply dropped.
    pub fn close(self) -> StoreResult<()> {
        if let Ok(mutex) = Arc::try_unwrap(self.conn) {
            let conn = mutex.into_inner().unwrap();
            conn.close().map_err(|(_, err)| err)?;
        }
        Ok(())
    }

    /// Run the migration pipeline and log a one-line summary.
    fn migrate(&self) {
        let conn = self.conn.lock().unwrap();
        let reports = migrations::run(&conn);
        let applied = reports
            .iter()
            .filter(|r| r.outcome == migrations::MigrationOutcome::Applied)
            .count();
        info!(steps = reports.len(), applied, "schema migration complete");
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.conn.lock().unwrap();
        f(&conn)
    }
}
