//! Snapshot: the complete desk state at an instant, as JSON-ready data.
//!
//! Used by the runner to answer state queries. A snapshot is a read-only
//! view; it is never fed back into the engine.

use crate::{
    assignment::Workload,
    case::Case,
    metrics::QueueSummary,
    risk::Thresholds,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskSnapshot {
    pub taken_at:   Timestamp,
    pub thresholds: Thresholds,
    pub summary:    QueueSummary,
    pub workload:   Vec<Workload>,
    /// Newest first.
    pub cases:      Vec<Case>,
}
