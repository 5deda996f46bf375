// crates/vmp-store-sqlite/src/store.rs
// ============================================================================
// Module: Store
// Description: The shared SQLite connection and its concurrency guarantees.
// Purpose: Give every repository one mutex-guarded writer connection and a
//          per-case lock primitive for status-derivation transactions.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! `SQLite`'s single-writer nature is made explicit rather than fought: one
//! [`rusqlite::Connection`] lives behind one `std::sync::Mutex`, mirroring
//! the teacher's `SqliteRunStateStore`. WAL journal mode lets readers proceed
//! during a write, but this crate has no separate read pool; every call
//! takes the same lock. Status-derivation transactions that touch a case's
//! checklist and evidence together additionally take a `BEGIN IMMEDIATE`
//! transaction (see [`Store::with_case_lock`]) so two concurrent decisions on
//! the same case cannot interleave.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OpenFlags;

use crate::error::SqliteStoreError;
use crate::schema;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Shared, mutex-guarded `SQLite` connection backing every repository.
pub struct Store {
    connection: Mutex<Connection>,
}

impl Store {
    /// Opens (creating if absent) a WAL-mode database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the file cannot be opened or the
    /// schema cannot be initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Self::configure(&conn)?;
        schema::initialize(&conn)?;
        Ok(Self {
            connection: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the schema cannot be initialized.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let conn = Connection::open_in_memory().map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Self::configure(&conn)?;
        schema::initialize(&conn)?;
        Ok(Self {
            connection: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<(), SqliteStoreError> {
        conn.busy_timeout(std::time::Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA synchronous=FULL;\
             PRAGMA foreign_keys=ON;",
        )?;
        Ok(())
    }

    /// Runs `f` with exclusive access to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex was poisoned by a prior
    /// panicking holder; the guard is still handed to `f` in that case so a
    /// caller that only reads can continue operating.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self.connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction scoped to one case,
    /// committing on success and rolling back on error or panic unwind.
    ///
    /// This is the single-writer guarantee for case status derivation: two
    /// concurrent decisions on the same `case_id` cannot interleave their
    /// checklist/evidence reads and status writes, because `BEGIN IMMEDIATE`
    /// takes SQLite's write lock up front rather than on first write.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the transaction cannot be started,
    /// `f` fails, or the commit fails.
    pub fn with_case_lock<T>(
        &self,
        case_id: &str,
        f: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let guard = self.connection.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.execute_batch("BEGIN IMMEDIATE")?;
        tracing::debug!(case_id, "acquired case lock");
        match f(&guard) {
            Ok(value) => {
                guard.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                let _ = guard.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]
    use super::*;

    #[test]
    fn opens_in_memory_and_initializes_schema() {
        let store = Store::open_in_memory().expect("open");
        let count: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM schema_meta", [], |row| row.get(0))
                    .map_err(SqliteStoreError::from)
            })
            .expect("query");
        assert_eq!(count, 1);
    }

    #[test]
    fn case_lock_commits_on_success() {
        let store = Store::open_in_memory().expect("open");
        let result = store.with_case_lock("CASE-1", |_conn| Ok(42));
        assert_eq!(result.expect("lock"), 42);
    }

    #[test]
    fn case_lock_rolls_back_on_error() {
        let store = Store::open_in_memory().expect("open");
        let result: Result<(), SqliteStoreError> = store.with_case_lock("CASE-1", |conn| {
            conn.execute(
                "INSERT INTO tenants (tenant_id, client_id, vendor_id, name, email, settings, status, onboarding_status, created_at, updated_at) VALUES ('TNT-1','TC-1','TV-1','n','e','{}','active','pending','2026-01-01T00:00:00Z','2026-01-01T00:00:00Z')",
                [],
            )?;
            Err(SqliteStoreError::Invalid("force rollback".to_string()))
        });
        assert!(result.is_err());
        let count: i64 = store
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM tenants", [], |row| row.get(0))
                    .map_err(SqliteStoreError::from)
            })
            .expect("query");
        assert_eq!(count, 0);
    }
}
