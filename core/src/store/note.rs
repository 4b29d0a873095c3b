//! Case note queries.

use super::{from_millis, to_millis, CaseStore};
use crate::{case::CaseNote, error::DeskResult, types::Timestamp};
use rusqlite::params;

impl CaseStore {
    pub fn insert_note(&self, case_id: &str, body: &str, now: Timestamp) -> DeskResult<CaseNote> {
        self.conn.execute(
            "INSERT INTO case_note (case_id, body, created_at) VALUES (?1, ?2, ?3)",
            params![case_id, body, to_millis(now)],
        )?;
        Ok(CaseNote {
            note_id:    self.conn.last_insert_rowid(),
            case_id:    case_id.to_string(),
            body:       body.to_string(),
            created_at: now,
        })
    }

    /// Newest first.
    pub fn notes_for(&self, case_id: &str) -> DeskResult<Vec<CaseNote>> {
        let mut stmt = self.conn.prepare(
            "SELECT note_id, case_id, body, created_at FROM case_note
             WHERE case_id = ?1
             ORDER BY note_id DESC",
        )?;
        let notes = stmt
            .query_map(params![case_id], |r| {
                Ok(CaseNote {
                    note_id:    r.get(0)?,
                    case_id:    r.get(1)?,
                    body:       r.get(2)?,
                    created_at: from_millis(3, r.get(3)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }
}
