//! Case queries.

use super::{conversion_error, from_millis, to_millis, CaseStore};
use crate::{
    analyst::Tier,
    case::{Case, CaseStatus, Decision},
    error::{DeskError, DeskResult},
    risk::Priority,
    sla,
    types::Timestamp,
};
use rusqlite::{params, OptionalExtension, Row};

const CASE_COLUMNS: &str =
    "case_id, tx_id, risk_score, priority, status, assigned_to, assigned_tier,
     sla_due_at, reason_codes, decision, decision_reason, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Created,
    Updated,
    /// The case is CLOSED; nothing was written.
    Frozen,
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub case: Case,
    pub kind: UpsertKind,
}

fn case_from_row(r: &Row<'_>) -> rusqlite::Result<Case> {
    let priority: String = r.get(3)?;
    let status: String = r.get(4)?;
    let assigned_tier: Option<String> = r.get(6)?;
    let reasons_json: String = r.get(8)?;
    let decision: Option<String> = r.get(9)?;

    Ok(Case {
        case_id: r.get(0)?,
        tx_id: r.get(1)?,
        risk_score: r.get(2)?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| conversion_error(3, format!("unknown priority {priority}")))?,
        status: CaseStatus::parse(&status)
            .ok_or_else(|| conversion_error(4, format!("unknown status {status}")))?,
        assigned_to: r.get(5)?,
        assigned_tier: match assigned_tier {
            Some(t) => Some(
                Tier::parse(&t).ok_or_else(|| conversion_error(6, format!("unknown tier {t}")))?,
            ),
            None => None,
        },
        sla_due_at: from_millis(7, r.get(7)?)?,
        reason_codes: serde_json::from_str(&reasons_json)
            .map_err(|e| conversion_error(8, e.to_string()))?,
        decision: match decision {
            Some(d) => Some(
                Decision::parse(&d)
                    .ok_or_else(|| conversion_error(9, format!("unknown decision {d}")))?,
            ),
            None => None,
        },
        decision_reason: r.get(10)?,
        created_at: from_millis(11, r.get(11)?)?,
        updated_at: from_millis(12, r.get(12)?)?,
    })
}

impl CaseStore {
    pub fn get_case(&self, case_id: &str) -> DeskResult<Option<Case>> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE case_id = ?1");
        Ok(self
            .conn
            .query_row(&sql, params![case_id], case_from_row)
            .optional()?)
    }

    fn require_case(&self, case_id: &str) -> DeskResult<Case> {
        self.get_case(case_id)?
            .ok_or_else(|| DeskError::CaseNotFound { case_id: case_id.to_string() })
    }

    /// The case bound to `tx_id`, if any.
    ///
    /// Panics if more than one case exists for the transaction: that is a
    /// store-consistency bug and must not be papered over.
    pub fn find_by_tx(&self, tx_id: &str) -> DeskResult<Option<Case>> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE tx_id = ?1 ORDER BY seq");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt
            .query_map(params![tx_id], case_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        assert!(
            rows.len() <= 1,
            "case store invariant broken: {} cases for transaction {tx_id}",
            rows.len()
        );
        Ok(rows.pop())
    }

    /// Newest first.
    pub fn list_cases(&self) -> DeskResult<Vec<Case>> {
        self.query_cases("1 = 1", "created_at DESC, seq DESC", params![])
    }

    /// Every non-closed case, oldest first.
    pub fn open_cases(&self) -> DeskResult<Vec<Case>> {
        self.query_cases("status != 'CLOSED'", "seq ASC", params![])
    }

    /// Non-closed cases currently held by `analyst_id`.
    pub fn open_cases_for(&self, analyst_id: &str) -> DeskResult<Vec<Case>> {
        self.query_cases(
            "assigned_to = ?1 AND status != 'CLOSED'",
            "seq ASC",
            params![analyst_id],
        )
    }

    /// Cases awaiting an assignee, in creation order.
    pub fn unassigned_open_cases(&self) -> DeskResult<Vec<Case>> {
        self.query_cases(
            "assigned_to IS NULL AND status != 'CLOSED'",
            "seq ASC",
            params![],
        )
    }

    pub fn case_count(&self) -> DeskResult<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM cases", [], |r| r.get(0))?)
    }

    fn query_cases(
        &self,
        filter: &str,
        order: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> DeskResult<Vec<Case>> {
        let sql = format!("SELECT {CASE_COLUMNS} FROM cases WHERE {filter} ORDER BY {order}");
        let mut stmt = self.conn.prepare(&sql)?;
        let cases = stmt
            .query_map(args, case_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cases)
    }

    /// Open or refresh the case for `tx_id`.
    ///
    /// - No case: insert as NEW, unassigned, SLA from the current priority.
    /// - Open case: refresh risk, priority and reasons only. Assignee, SLA,
    ///   status and created_at are preserved.
    /// - CLOSED case: untouched.
    pub fn upsert(
        &self,
        tx_id: &str,
        risk_score: u8,
        priority: Priority,
        reason_codes: &[String],
        now: Timestamp,
    ) -> DeskResult<UpsertOutcome> {
        let txn = self.conn.unchecked_transaction()?;
        let reasons_json = serde_json::to_string(reason_codes)?;

        let kind = match self.find_by_tx(tx_id)? {
            Some(existing) if existing.status.is_closed() => {
                txn.commit()?;
                return Ok(UpsertOutcome { case: existing, kind: UpsertKind::Frozen });
            }
            Some(existing) => {
                self.conn.execute(
                    "UPDATE cases SET risk_score = ?1, priority = ?2, reason_codes = ?3,
                        updated_at = ?4
                     WHERE case_id = ?5",
                    params![
                        risk_score,
                        priority.as_str(),
                        reasons_json,
                        to_millis(now),
                        existing.case_id,
                    ],
                )?;
                UpsertKind::Updated
            }
            None => {
                let seq: i64 = self.conn.query_row(
                    "SELECT COALESCE(MAX(seq), 0) + 1 FROM cases",
                    [],
                    |r| r.get(0),
                )?;
                let case_id = format!("CASE-{seq:04}");
                self.conn.execute(
                    "INSERT INTO cases (seq, case_id, tx_id, risk_score, priority, status,
                        sla_due_at, reason_codes, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, 'NEW', ?6, ?7, ?8, ?8)",
                    params![
                        seq,
                        case_id,
                        tx_id,
                        risk_score,
                        priority.as_str(),
                        to_millis(sla::due_at(priority, now)),
                        reasons_json,
                        to_millis(now),
                    ],
                )?;
                UpsertKind::Created
            }
        };

        let case = self
            .find_by_tx(tx_id)?
            .ok_or_else(|| anyhow::anyhow!("case for {tx_id} vanished inside upsert"))?;
        txn.commit()?;
        Ok(UpsertOutcome { case, kind })
    }

    /// Move a case to `to`. Returns the updated case and its previous status.
    /// Same-state moves return the case unchanged.
    pub fn update_status(
        &self,
        case_id: &str,
        to: CaseStatus,
        now: Timestamp,
    ) -> DeskResult<(Case, CaseStatus)> {
        let txn = self.conn.unchecked_transaction()?;
        let case = self.require_case(case_id)?;
        let from = case.status;

        if !from.can_transition_to(to) {
            return Err(DeskError::InvalidTransition {
                case_id: case_id.to_string(),
                from,
                to,
            });
        }
        if from == to {
            return Ok((case, from));
        }

        self.conn.execute(
            "UPDATE cases SET status = ?1, updated_at = ?2 WHERE case_id = ?3",
            params![to.as_str(), to_millis(now), case_id],
        )?;
        let updated = self.require_case(case_id)?;
        txn.commit()?;
        Ok((updated, from))
    }

    /// Record the analyst's verdict and close the case.
    pub fn record_decision(
        &self,
        case_id: &str,
        decision: Decision,
        reason: &str,
        now: Timestamp,
    ) -> DeskResult<(Case, CaseStatus)> {
        let txn = self.conn.unchecked_transaction()?;
        let case = self.require_case(case_id)?;
        let from = case.status;

        if !from.can_transition_to(CaseStatus::Closed) {
            return Err(DeskError::InvalidTransition {
                case_id: case_id.to_string(),
                from,
                to: CaseStatus::Closed,
            });
        }

        self.conn.execute(
            "UPDATE cases SET status = 'CLOSED', decision = ?1, decision_reason = ?2,
                updated_at = ?3
             WHERE case_id = ?4",
            params![decision.as_str(), reason, to_millis(now), case_id],
        )?;
        let updated = self.require_case(case_id)?;
        txn.commit()?;
        Ok((updated, from))
    }

    /// Bind an analyst to an unassigned, open case.
    ///
    /// Only ever fills an empty slot: an existing assignee is never replaced
    /// and a CLOSED case is never touched. Returns the stored case and
    /// whether this call wrote the assignee.
    pub fn set_assignment(
        &self,
        case_id: &str,
        analyst_id: &str,
        tier: Tier,
        now: Timestamp,
    ) -> DeskResult<(Case, bool)> {
        let txn = self.conn.unchecked_transaction()?;
        let changed = self.conn.execute(
            "UPDATE cases SET assigned_to = ?1, assigned_tier = ?2, updated_at = ?3
             WHERE case_id = ?4 AND assigned_to IS NULL AND status != 'CLOSED'",
            params![analyst_id, tier.as_str(), to_millis(now), case_id],
        )?;
        let case = self.require_case(case_id)?;
        if changed == 0 {
            log::debug!(
                "case {case_id} assignment: slot not open (assigned_to={:?}, status={})",
                case.assigned_to,
                case.status
            );
        }
        txn.commit()?;
        Ok((case, changed > 0))
    }
}
