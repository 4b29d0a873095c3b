use crate::{
    case::{CaseStatus, Decision},
    transaction::Transaction,
    types::CaseId,
};
use serde::{Deserialize, Serialize};

/// Every action the surrounding application can issue against the desk.
/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Intake ─────────────────────────────────────
    Evaluate {
        tx: Transaction,
    },

    // ── Analyst actions ────────────────────────────
    UpdateStatus {
        case_id: CaseId,
        status:  CaseStatus,
    },
    RecordDecision {
        case_id:  CaseId,
        decision: Decision,
        reason:   String,
    },
    AddNote {
        case_id: CaseId,
        body:    String,
    },

    // ── Administration ─────────────────────────────
    SetThresholds {
        orange: i64,
        red:    i64,
    },
    AssignPending,
}
