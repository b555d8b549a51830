//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Pipeline stages never see a connection; the runner hands finished
//! relations to the store after the pipeline has returned.

use crate::error::{EtlError, EtlResult};
use rusqlite::{Connection, OpenFlags};

mod results;
mod run_log;

pub use run_log::RunLogEntry;

pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    pub fn open(path: &str) -> EtlResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            log::debug!("store: WAL not enabled for {path}: {e}");
        }
        log::debug!("store: opened {path}");
        Ok(Self { conn })
    }

    /// Private in-memory database, gone when the store is dropped.
    pub fn in_memory() -> EtlResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Apply the fixed schema migrations in order.
    pub fn migrate(&self) -> EtlResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_run_log.sql"))?;
        Ok(())
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
pub(crate) fn checked_table_name(name: &str) -> EtlResult<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_start && valid_rest && name.len() <= 63 {
        Ok(name)
    } else {
        Err(EtlError::InvalidTableName {
            name: name.to_string(),
        })
    }
}
