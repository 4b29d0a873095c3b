//! The case lifecycle controller.
//!
//! FLOW (one direction only):
//!   Transaction → risk score → classification
//!     → (risk >= RED) case upsert → auto-assignment → Case
//!   Analyst actions (status, decision, note) go straight to the store.
//!
//! RULES:
//!   - One writer: every public operation holds the store lock for its whole
//!     duration, so callers never observe a half-applied change.
//!   - Audit events are emitted after the lock is released. A failing sink
//!     is logged and ignored; it never rolls back case state.
//!   - CLOSED cases are frozen against automatic re-evaluation.

use crate::{
    analyst::{AnalystRoster, StaticRoster},
    assignment::{self, AssignmentEngine, AssignmentOutcome, Workload},
    audit::AuditSink,
    case::{Case, CaseNote, CaseStatus, Decision},
    command::DeskCommand,
    config::DeskConfig,
    error::{DeskError, DeskResult},
    event::CaseEvent,
    metrics::{self, QueueSummary},
    reasons,
    risk::{self, Thresholds},
    snapshot::DeskSnapshot,
    store::{CaseStore, UpsertKind},
    transaction::{Transaction, TransactionSource},
    types::Timestamp,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// What applying a DeskCommand produced.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// `None` when an evaluated transaction stayed below RED.
    Case(Option<Case>),
    Note(CaseNote),
    Thresholds(Thresholds),
    Assigned(Vec<Case>),
}

pub struct CaseEngine {
    store:      Mutex<CaseStore>,
    thresholds: RwLock<Thresholds>,
    assigner:   AssignmentEngine,
    audit:      Arc<dyn AuditSink>,
}

impl CaseEngine {
    pub fn new(
        store: CaseStore,
        thresholds: Thresholds,
        roster: Arc<dyn AnalystRoster>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store:      Mutex::new(store),
            thresholds: RwLock::new(thresholds),
            assigner:   AssignmentEngine::new(roster),
            audit,
        }
    }

    /// Build a fully wired engine from configuration.
    /// Returns the roster handle so the caller can edit it at runtime.
    pub fn build(
        config: &DeskConfig,
        audit: Arc<dyn AuditSink>,
    ) -> DeskResult<(Self, Arc<StaticRoster>)> {
        config.validate()?;
        let roster = Arc::new(StaticRoster::new(config.roster.clone()));
        let engine = Self::new(
            CaseStore::in_memory()?,
            config.thresholds,
            roster.clone(),
            audit,
        );
        Ok((engine, roster))
    }

    // ── Configuration ──────────────────────────────────────────

    pub fn thresholds(&self) -> Thresholds {
        *self.thresholds.read()
    }

    /// Replace the alert thresholds. On rejection the current pair stays.
    pub fn update_thresholds(&self, orange: i64, red: i64) -> DeskResult<Thresholds> {
        let next = match Thresholds::new(orange, red) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("thresholds: rejected orange={orange} red={red}: {e}");
                return Err(e);
            }
        };
        *self.thresholds.write() = next;
        log::info!("thresholds: now orange={} red={}", next.orange(), next.red());
        self.emit(vec![CaseEvent::ThresholdsUpdated {
            orange: next.orange(),
            red:    next.red(),
        }]);
        Ok(next)
    }

    // ── Intake ─────────────────────────────────────────────────

    /// Evaluate a transaction against the configured thresholds.
    pub fn ingest(&self, tx: &Transaction, now: Timestamp) -> DeskResult<Option<Case>> {
        let thresholds = self.thresholds();
        self.evaluate_transaction(tx, &thresholds, now)
    }

    /// Score, classify and, at RED, open or refresh the transaction's case
    /// and try to assign it. Returns `None` below RED.
    pub fn evaluate_transaction(
        &self,
        tx: &Transaction,
        thresholds: &Thresholds,
        now: Timestamp,
    ) -> DeskResult<Option<Case>> {
        if tx.tx_id.trim().is_empty() {
            return Err(DeskError::InvalidInput {
                reason: "transaction id must not be empty".to_string(),
            });
        }

        let risk_score = risk::score(tx);
        let class = risk::classify(risk_score, thresholds);
        if !thresholds.opens_case(risk_score) {
            log::debug!("tx {} scored {risk_score} ({}); no case", tx.tx_id, class.label);
            return Ok(None);
        }
        let reasons = reasons::reasons(tx, risk_score, thresholds);

        let mut events = Vec::new();
        let case = {
            let store = self.store.lock();
            let upserted = store.upsert(&tx.tx_id, risk_score, class.priority, &reasons, now)?;
            let case = upserted.case;

            match upserted.kind {
                UpsertKind::Created => {
                    log::info!(
                        "case {} opened for tx {} (risk {risk_score}, {})",
                        case.case_id,
                        tx.tx_id,
                        case.priority
                    );
                    events.push(CaseEvent::CaseCreated {
                        case_id:    case.case_id.clone(),
                        tx_id:      case.tx_id.clone(),
                        risk_score,
                        priority:   case.priority,
                    });
                }
                UpsertKind::Updated | UpsertKind::Frozen => {
                    let frozen = upserted.kind == UpsertKind::Frozen;
                    if frozen {
                        log::debug!(
                            "case {} is CLOSED; re-evaluation of tx {} ignored",
                            case.case_id,
                            tx.tx_id
                        );
                    }
                    events.push(CaseEvent::CaseReevaluated {
                        case_id: case.case_id.clone(),
                        tx_id: case.tx_id.clone(),
                        risk_score,
                        priority: class.priority,
                        frozen,
                    });
                }
            }

            if upserted.kind == UpsertKind::Frozen {
                case
            } else {
                let outcome = self.assigner.assign(&store, case, now)?;
                events.extend(assignment_event(&outcome));
                outcome.into_case()
            }
        };

        self.emit(events);
        Ok(Some(case))
    }

    /// Fetch a transaction from the ledger and evaluate it.
    pub fn evaluate_stored(
        &self,
        source: &dyn TransactionSource,
        tx_id: &str,
        now: Timestamp,
    ) -> DeskResult<Option<Case>> {
        let tx = source
            .get_transaction(tx_id)?
            .ok_or_else(|| DeskError::TransactionNotFound { tx_id: tx_id.to_string() })?;
        self.ingest(&tx, now)
    }

    /// Replay the whole ledger in stream order, each transaction evaluated at
    /// its own timestamp. Returns how many evaluations touched a case.
    pub fn rebuild_from(&self, source: &dyn TransactionSource) -> DeskResult<usize> {
        let txs = source.list_transactions()?;
        let mut touched = 0;
        for tx in &txs {
            if self.ingest(tx, tx.timestamp)?.is_some() {
                touched += 1;
            }
        }
        log::info!("rebuild: replayed {} transactions, {touched} case evaluations", txs.len());
        Ok(touched)
    }

    // ── Assignment ─────────────────────────────────────────────

    /// Retry assignment for one case.
    pub fn assign_case(&self, case_id: &str, now: Timestamp) -> DeskResult<AssignmentOutcome> {
        let outcome = {
            let store = self.store.lock();
            let case = store
                .get_case(case_id)?
                .ok_or_else(|| DeskError::CaseNotFound { case_id: case_id.to_string() })?;
            self.assigner.assign(&store, case, now)?
        };
        self.emit(assignment_event(&outcome).into_iter().collect());
        Ok(outcome)
    }

    /// Retry every unassigned open case, oldest first.
    /// Returns the cases that gained an assignee.
    pub fn assign_pending(&self, now: Timestamp) -> DeskResult<Vec<Case>> {
        let mut events = Vec::new();
        let mut assigned = Vec::new();
        {
            let store = self.store.lock();
            for case in store.unassigned_open_cases()? {
                let outcome = self.assigner.assign(&store, case, now)?;
                if let Some(event) = assignment_event(&outcome) {
                    events.push(event);
                    assigned.push(outcome.into_case());
                }
            }
        }
        self.emit(events);
        Ok(assigned)
    }

    // ── Analyst actions ────────────────────────────────────────

    pub fn update_case_status(
        &self,
        case_id: &str,
        status: CaseStatus,
        now: Timestamp,
    ) -> DeskResult<Case> {
        let (case, from) = {
            let store = self.store.lock();
            match store.update_status(case_id, status, now) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("case {case_id} status: {e}");
                    return Err(e);
                }
            }
        };
        if from != status {
            log::info!("case {case_id} status: {from} -> {status}");
            self.emit(vec![CaseEvent::CaseStatusChanged {
                case_id: case.case_id.clone(),
                from,
                to:      status,
            }]);
        }
        Ok(case)
    }

    /// Store the verdict and close the case.
    pub fn record_decision(
        &self,
        case_id: &str,
        decision: Decision,
        reason: &str,
        now: Timestamp,
    ) -> DeskResult<Case> {
        let (case, from) = self.store.lock().record_decision(case_id, decision, reason, now)?;
        log::info!("case {case_id} decision: {decision} ({from} -> CLOSED)");

        self.emit(vec![
            CaseEvent::CaseDecisionRecorded {
                case_id:  case.case_id.clone(),
                decision,
                reason:   reason.to_string(),
            },
            CaseEvent::CaseStatusChanged {
                case_id: case.case_id.clone(),
                from,
                to:      CaseStatus::Closed,
            },
        ]);
        Ok(case)
    }

    /// Attach a free-text note. Allowed on CLOSED cases.
    pub fn add_note(&self, case_id: &str, body: &str, now: Timestamp) -> DeskResult<CaseNote> {
        let body = body.trim();
        if body.is_empty() {
            return Err(DeskError::InvalidInput { reason: "note must not be empty".to_string() });
        }
        let note = {
            let store = self.store.lock();
            if store.get_case(case_id)?.is_none() {
                return Err(DeskError::CaseNotFound { case_id: case_id.to_string() });
            }
            store.insert_note(case_id, body, now)?
        };
        self.emit(vec![CaseEvent::CaseNoteAdded {
            case_id: note.case_id.clone(),
            note_id: note.note_id,
        }]);
        Ok(note)
    }

    pub fn notes(&self, case_id: &str) -> DeskResult<Vec<CaseNote>> {
        self.store.lock().notes_for(case_id)
    }

    // ── Queries ────────────────────────────────────────────────

    /// Newest first.
    pub fn list_cases(&self) -> DeskResult<Vec<Case>> {
        self.store.lock().list_cases()
    }

    pub fn get_case(&self, case_id: &str) -> DeskResult<Option<Case>> {
        self.store.lock().get_case(case_id)
    }

    pub fn case_for_transaction(&self, tx_id: &str) -> DeskResult<Option<Case>> {
        self.store.lock().find_by_tx(tx_id)
    }

    /// Open cases, soonest SLA first.
    pub fn queue(&self) -> DeskResult<Vec<Case>> {
        let mut open = self.store.lock().open_cases()?;
        metrics::sort_by_sla(&mut open);
        Ok(open)
    }

    pub fn queue_summary(&self, now: Timestamp) -> DeskResult<QueueSummary> {
        let open = self.store.lock().open_cases()?;
        Ok(metrics::summarize(&open, now))
    }

    /// Load per analyst, in roster order. Inactive analysts are included so
    /// their leftover queue stays visible.
    pub fn analyst_workload(&self, now: Timestamp) -> DeskResult<Vec<Workload>> {
        let store = self.store.lock();
        let roster = self.assigner.roster().list_analysts();
        let workload = roster
            .iter()
            .map(|a| assignment::workload(&store, a, now))
            .collect::<DeskResult<Vec<_>>>()?;
        Ok(workload)
    }

    pub fn snapshot(&self, now: Timestamp) -> DeskResult<DeskSnapshot> {
        let (cases, open, workload) = {
            let store = self.store.lock();
            let roster = self.assigner.roster().list_analysts();
            let workload = roster
                .iter()
                .map(|a| assignment::workload(&store, a, now))
                .collect::<DeskResult<Vec<_>>>()?;
            (store.list_cases()?, store.open_cases()?, workload)
        };
        Ok(DeskSnapshot {
            taken_at:   now,
            thresholds: self.thresholds(),
            summary:    metrics::summarize(&open, now),
            workload,
            cases,
        })
    }

    // ── Commands ───────────────────────────────────────────────

    pub fn apply(&self, command: DeskCommand, now: Timestamp) -> DeskResult<CommandResult> {
        match command {
            DeskCommand::Evaluate { tx } => Ok(CommandResult::Case(self.ingest(&tx, now)?)),
            DeskCommand::UpdateStatus { case_id, status } => Ok(CommandResult::Case(Some(
                self.update_case_status(&case_id, status, now)?,
            ))),
            DeskCommand::RecordDecision { case_id, decision, reason } => Ok(CommandResult::Case(
                Some(self.record_decision(&case_id, decision, &reason, now)?),
            )),
            DeskCommand::AddNote { case_id, body } => {
                Ok(CommandResult::Note(self.add_note(&case_id, &body, now)?))
            }
            DeskCommand::SetThresholds { orange, red } => {
                Ok(CommandResult::Thresholds(self.update_thresholds(orange, red)?))
            }
            DeskCommand::AssignPending => Ok(CommandResult::Assigned(self.assign_pending(now)?)),
        }
    }

    fn emit(&self, events: Vec<CaseEvent>) {
        for event in events {
            let meta = match event.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("audit: cannot serialize {}: {e}", event.action());
                    continue;
                }
            };
            if let Err(e) = self.audit.record_event(event.action(), meta) {
                log::warn!("audit: {} not recorded: {e}", event.action());
            }
        }
    }
}

fn assignment_event(outcome: &AssignmentOutcome) -> Option<CaseEvent> {
    match outcome {
        AssignmentOutcome::Assigned { case, analyst, required_tier, .. } => {
            Some(CaseEvent::CaseAssigned {
                case_id:       case.case_id.clone(),
                tx_id:         case.tx_id.clone(),
                assigned_to:   analyst.id.clone(),
                tier:          analyst.tier,
                required_tier: *required_tier,
            })
        }
        _ => None,
    }
}
