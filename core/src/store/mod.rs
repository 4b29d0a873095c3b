//! SQLite persistence layer for case state.
//!
//! RULE: Only store/ talks to the database.
//! The engine calls store methods; it never executes SQL directly.
//!
//! The database is in-process (`:memory:`). State lives as long as the
//! engine does and is rebuilt from the transaction stream on restart.

mod case;
mod note;

pub use case::{UpsertKind, UpsertOutcome};

use crate::{error::DeskResult, types::Timestamp};
use chrono::DateTime;
use rusqlite::{types::Type, Connection};

pub struct CaseStore {
    conn: Connection,
}

impl CaseStore {
    /// Open a fresh in-memory store with the schema applied.
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_case_desk.sql"))?;
        Ok(())
    }
}

// ── Column conversions ─────────────────────────────────────────

pub(crate) fn to_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<Timestamp> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| conversion_error(idx, format!("timestamp out of range: {millis}")))
}

pub(crate) fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}
