//! Case records and the status state machine.
//!
//! NEW ──► IN_REVIEW ──► ESCALATED ──► CLOSED
//!  │          │                         ▲
//!  │          └─────────────────────────┤
//!  ├──► ESCALATED                       │
//!  └────────────────────────────────────┘
//!
//! CLOSED is terminal. Same-state moves are no-ops.

use crate::{
    analyst::Tier,
    risk::Priority,
    types::{AnalystId, CaseId, Timestamp, TxId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    New,
    InReview,
    Escalated,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New       => "NEW",
            Self::InReview  => "IN_REVIEW",
            Self::Escalated => "ESCALATED",
            Self::Closed    => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW"       => Some(Self::New),
            "IN_REVIEW" => Some(Self::InReview),
            "ESCALATED" => Some(Self::Escalated),
            "CLOSED"    => Some(Self::Closed),
            _           => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn can_transition_to(&self, to: CaseStatus) -> bool {
        use CaseStatus::*;
        match (*self, to) {
            (Closed, _) => false,
            (from, to) if from == to => true,
            (New, InReview | Escalated | Closed) => true,
            (InReview, Escalated | Closed) => true,
            (Escalated, Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final analyst verdict on the underlying transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject  => "REJECT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "APPROVE" => Some(Self::Approve),
            "REJECT"  => Some(Self::Reject),
            _         => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub case_id:         CaseId,
    pub tx_id:           TxId,
    pub risk_score:      u8,
    pub priority:        Priority,
    pub status:          CaseStatus,
    pub assigned_to:     Option<AnalystId>,
    pub assigned_tier:   Option<Tier>,
    pub sla_due_at:      Timestamp,
    pub reason_codes:    Vec<String>,
    pub decision:        Option<Decision>,
    pub decision_reason: Option<String>,
    pub created_at:      Timestamp,
    pub updated_at:      Timestamp,
}

impl Case {
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNote {
    pub note_id:    i64,
    pub case_id:    CaseId,
    pub body:       String,
    pub created_at: Timestamp,
}
