//! Analysts and the roster seam.
//!
//! The roster is owned outside the desk. The assignment engine only reads it,
//! and relies on its ORDER for tie-breaks, so implementations must return a
//! stable sequence (never a hash-map iteration).

use crate::types::AnalystId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::T1 => "T1",
            Self::T2 => "T2",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "T1" => Some(Self::T1),
            "T2" => Some(Self::T2),
            _    => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analyst {
    pub id:     AnalystId,
    #[serde(default)]
    pub email:  Option<String>,
    pub tier:   Tier,
    pub active: bool,
}

impl Analyst {
    pub fn new(id: impl Into<AnalystId>, tier: Tier) -> Self {
        Self { id: id.into(), email: None, tier, active: true }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

pub trait AnalystRoster: Send + Sync {
    /// Every analyst, active or not, in stable roster order.
    fn list_analysts(&self) -> Vec<Analyst>;

    fn list_active_analysts(&self) -> Vec<Analyst> {
        self.list_analysts().into_iter().filter(|a| a.active).collect()
    }
}

/// A roster held in memory, editable at runtime by the surrounding app.
#[derive(Debug, Default)]
pub struct StaticRoster {
    analysts: RwLock<Vec<Analyst>>,
}

impl StaticRoster {
    pub fn new(analysts: Vec<Analyst>) -> Self {
        Self { analysts: RwLock::new(analysts) }
    }

    /// Toggle an analyst. Returns false when the id is unknown.
    pub fn set_active(&self, id: &str, active: bool) -> bool {
        let mut analysts = self.analysts.write();
        match analysts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.active = active;
                true
            }
            None => false,
        }
    }

    /// Replace an analyst in place, or append a new one at the end of the roster.
    pub fn upsert(&self, analyst: Analyst) {
        let mut analysts = self.analysts.write();
        match analysts.iter_mut().find(|a| a.id == analyst.id) {
            Some(existing) => *existing = analyst,
            None => analysts.push(analyst),
        }
    }
}

impl AnalystRoster for StaticRoster {
    fn list_analysts(&self) -> Vec<Analyst> {
        self.analysts.read().clone()
    }
}
