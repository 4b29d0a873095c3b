//! Shared primitive types used across the whole desk.

use chrono::{DateTime, Utc};

/// Wall-clock instant. All SLA arithmetic happens in UTC.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a transaction, owned by the upstream ledger.
pub type TxId = String;

/// Identifier of an investigation case, generated by the case store.
pub type CaseId = String;

/// Identifier of an analyst on the roster.
pub type AnalystId = String;
