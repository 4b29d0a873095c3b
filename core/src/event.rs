//! Case events: the single source of audit payloads.
//!
//! RULE: every state change the desk makes is described by exactly one
//! CaseEvent. The engine hands events to the AuditSink after the mutation
//! has committed. Variants are appended, never removed or reordered.

use crate::{
    analyst::Tier,
    case::{CaseStatus, Decision},
    risk::Priority,
    types::{AnalystId, CaseId, TxId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaseEvent {
    CaseCreated {
        case_id:    CaseId,
        tx_id:      TxId,
        risk_score: u8,
        priority:   Priority,
    },
    CaseReevaluated {
        case_id:    CaseId,
        tx_id:      TxId,
        risk_score: u8,
        priority:   Priority,
        /// True when the case was CLOSED and the re-evaluation left it untouched.
        frozen:     bool,
    },
    CaseAssigned {
        case_id:       CaseId,
        tx_id:         TxId,
        assigned_to:   AnalystId,
        tier:          Tier,
        required_tier: Tier,
    },
    CaseStatusChanged {
        case_id: CaseId,
        from:    CaseStatus,
        to:      CaseStatus,
    },
    CaseDecisionRecorded {
        case_id:  CaseId,
        decision: Decision,
        reason:   String,
    },
    CaseNoteAdded {
        case_id: CaseId,
        note_id: i64,
    },
    ThresholdsUpdated {
        orange: u8,
        red:    u8,
    },
}

impl CaseEvent {
    /// Stable action name written to the audit log.
    pub fn action(&self) -> &'static str {
        match self {
            Self::CaseCreated { .. }          => "CASE_CREATED",
            Self::CaseReevaluated { .. }      => "CASE_REEVALUATED",
            Self::CaseAssigned { .. }         => "CASE_ASSIGNED",
            Self::CaseStatusChanged { .. }    => "CASE_STATUS_CHANGED",
            Self::CaseDecisionRecorded { .. } => "CASE_DECISION_RECORDED",
            Self::CaseNoteAdded { .. }        => "CASE_NOTE_ADDED",
            Self::ThresholdsUpdated { .. }    => "THRESHOLDS_UPDATED",
        }
    }

    /// Audit metadata: the event body without its tag.
    pub fn metadata(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("type");
        }
        Ok(value)
    }
}
