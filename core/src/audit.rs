//! Audit sink seam.
//!
//! Audit is best-effort: a failed write is logged and never rolls back the
//! case mutation that produced it.

use crate::types::Timestamp;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub trait AuditSink: Send + Sync {
    fn record_event(&self, action: &str, meta: serde_json::Value) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id:         String,
    pub action:     String,
    pub meta:       serde_json::Value,
    pub created_at: Timestamp,
}

/// Keeps every entry in memory, oldest first.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    pub fn entries_for(&self, action: &str) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record_event(&self, action: &str, meta: serde_json::Value) -> anyhow::Result<()> {
        self.entries.lock().push(AuditEntry {
            id:         format!("A-{}", uuid::Uuid::new_v4()),
            action:     action.to_string(),
            meta,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

/// Writes audit lines through the `log` facade under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record_event(&self, action: &str, meta: serde_json::Value) -> anyhow::Result<()> {
        log::info!(target: "audit", "{action} {meta}");
        Ok(())
    }
}
