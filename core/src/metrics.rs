//! SLA health and queue metrics over open cases.

use crate::{
    case::{Case, CaseStatus},
    sla,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub open:            u32,
    pub new:             u32,
    pub in_review:       u32,
    pub escalated:       u32,
    pub unassigned:      u32,
    pub due_soon:        u32,
    pub overdue:         u32,
    /// Mean whole minutes left across open cases; 0 when the queue is empty.
    pub avg_sla_minutes: i64,
}

/// Summarize `cases`, ignoring any that are CLOSED.
pub fn summarize(cases: &[Case], now: Timestamp) -> QueueSummary {
    let mut s = QueueSummary::default();
    let mut minutes_total: i64 = 0;

    for case in cases.iter().filter(|c| !c.status.is_closed()) {
        s.open += 1;
        match case.status {
            CaseStatus::New       => s.new += 1,
            CaseStatus::InReview  => s.in_review += 1,
            CaseStatus::Escalated => s.escalated += 1,
            CaseStatus::Closed    => {}
        }
        if !case.is_assigned() {
            s.unassigned += 1;
        }
        if sla::is_due_soon(case.sla_due_at, now) {
            s.due_soon += 1;
        }
        if sla::is_overdue(case.sla_due_at, now) {
            s.overdue += 1;
        }
        minutes_total += sla::minutes_remaining(case.sla_due_at, now);
    }

    if s.open > 0 {
        s.avg_sla_minutes = (minutes_total as f64 / s.open as f64).round() as i64;
    }
    s
}

/// Soonest deadline first; equal deadlines keep creation order.
pub fn sort_by_sla(cases: &mut [Case]) {
    cases.sort_by(|a, b| {
        a.sla_due_at
            .cmp(&b.sla_due_at)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| case_seq(&a.case_id).cmp(&case_seq(&b.case_id)))
            .then_with(|| a.case_id.cmp(&b.case_id))
    });
}

/// Numeric sequence of a `CASE-nnnn` id. `CASE-10000` follows `CASE-9999`.
fn case_seq(case_id: &str) -> Option<u64> {
    case_id.strip_prefix("CASE-")?.parse().ok()
}
