//! Assignment engine: routes an unassigned case to the best-fit analyst.
//!
//! 1. Tier rule: HIGH/CRITICAL need T2. Anything else prefers T1 and falls
//!    back to T2 only when no T1 analyst is active.
//! 2. Cost per eligible analyst: active + 3 * due_soon, counted over that
//!    analyst's non-closed cases.
//! 3. Lowest cost wins. Ties go to the analyst earliest in roster order.
//!
//! No eligible analyst is not an error: the case stays unassigned and is
//! retried on the next pass.

use crate::{
    analyst::{Analyst, AnalystRoster, Tier},
    case::Case,
    error::DeskResult,
    risk::Priority,
    sla,
    store::CaseStore,
    types::{AnalystId, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Weight of one due-soon case relative to one active case.
pub const SLA_PRESSURE_WEIGHT: u32 = 3;

#[derive(Debug, Clone)]
pub enum AssignmentOutcome {
    Assigned {
        case:          Case,
        analyst:       Analyst,
        required_tier: Tier,
        cost:          u32,
    },
    AlreadyAssigned(Case),
    /// CLOSED cases are never routed.
    Closed(Case),
    NoEligibleAnalyst {
        case:          Case,
        required_tier: Tier,
    },
}

impl AssignmentOutcome {
    pub fn case(&self) -> &Case {
        match self {
            Self::Assigned { case, .. }
            | Self::AlreadyAssigned(case)
            | Self::Closed(case)
            | Self::NoEligibleAnalyst { case, .. } => case,
        }
    }

    pub fn into_case(self) -> Case {
        match self {
            Self::Assigned { case, .. }
            | Self::AlreadyAssigned(case)
            | Self::Closed(case)
            | Self::NoEligibleAnalyst { case, .. } => case,
        }
    }
}

/// Load carried by one analyst at an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub analyst_id: AnalystId,
    pub tier:       Tier,
    pub active:     u32,
    pub due_soon:   u32,
    pub overdue:    u32,
}

impl Workload {
    pub fn cost(&self) -> u32 {
        self.active + SLA_PRESSURE_WEIGHT * self.due_soon
    }
}

pub fn workload(store: &CaseStore, analyst: &Analyst, now: Timestamp) -> DeskResult<Workload> {
    let open = store.open_cases_for(&analyst.id)?;
    let due_soon = open.iter().filter(|c| sla::is_due_soon(c.sla_due_at, now)).count();
    let overdue = open.iter().filter(|c| sla::is_overdue(c.sla_due_at, now)).count();
    Ok(Workload {
        analyst_id: analyst.id.clone(),
        tier:       analyst.tier,
        active:     open.len() as u32,
        due_soon:   due_soon as u32,
        overdue:    overdue as u32,
    })
}

/// The tier a case of this priority asks for.
pub fn required_tier(priority: Priority) -> Tier {
    if priority.requires_senior() { Tier::T2 } else { Tier::T1 }
}

/// Active analysts allowed to take a case of `priority`, in roster order.
pub fn eligible_analysts(roster: &[Analyst], priority: Priority) -> Vec<&Analyst> {
    let of_tier = |tier: Tier| -> Vec<&Analyst> {
        roster.iter().filter(|a| a.active && a.tier == tier).collect()
    };
    match required_tier(priority) {
        Tier::T2 => of_tier(Tier::T2),
        Tier::T1 => {
            let t1 = of_tier(Tier::T1);
            if t1.is_empty() { of_tier(Tier::T2) } else { t1 }
        }
    }
}

pub struct AssignmentEngine {
    roster: Arc<dyn AnalystRoster>,
}

impl AssignmentEngine {
    pub fn new(roster: Arc<dyn AnalystRoster>) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Arc<dyn AnalystRoster> {
        &self.roster
    }

    /// Pick the cheapest eligible analyst. Strict `<` keeps the first in
    /// roster order on ties.
    pub fn select(
        &self,
        store: &CaseStore,
        priority: Priority,
        now: Timestamp,
    ) -> DeskResult<Option<(Analyst, u32)>> {
        let roster = self.roster.list_analysts();
        let mut best: Option<(&Analyst, u32)> = None;
        for analyst in eligible_analysts(&roster, priority) {
            let cost = workload(store, analyst, now)?.cost();
            match best {
                Some((_, best_cost)) if cost >= best_cost => {}
                _ => best = Some((analyst, cost)),
            }
        }
        Ok(best.map(|(a, cost)| (a.clone(), cost)))
    }

    pub fn assign(
        &self,
        store: &CaseStore,
        case: Case,
        now: Timestamp,
    ) -> DeskResult<AssignmentOutcome> {
        if case.is_assigned() {
            return Ok(AssignmentOutcome::AlreadyAssigned(case));
        }
        if case.status.is_closed() {
            return Ok(AssignmentOutcome::Closed(case));
        }

        let required = required_tier(case.priority);
        let Some((analyst, cost)) = self.select(store, case.priority, now)? else {
            log::warn!(
                "case {} assignment: no eligible analyst for {} (requires {required}); will retry",
                case.case_id,
                case.priority
            );
            return Ok(AssignmentOutcome::NoEligibleAnalyst { case, required_tier: required });
        };

        let (updated, written) =
            store.set_assignment(&case.case_id, &analyst.id, analyst.tier, now)?;
        if !written {
            // The caller's copy was stale: report what the store holds.
            return Ok(if updated.status.is_closed() {
                AssignmentOutcome::Closed(updated)
            } else {
                AssignmentOutcome::AlreadyAssigned(updated)
            });
        }
        log::info!(
            "case {} assignment: {} -> {} ({}, cost {cost})",
            updated.case_id,
            updated.priority,
            analyst.id,
            analyst.tier
        );
        Ok(AssignmentOutcome::Assigned {
            case: updated,
            analyst,
            required_tier: required,
            cost,
        })
    }
}
