use crate::{
    analyst::{Analyst, Tier},
    error::{DeskError, DeskResult},
    risk::Thresholds,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Desk configuration as read from JSON.
///
/// ```json
/// {
///   "thresholds": { "orangeThreshold": 40, "redThreshold": 70 },
///   "roster": [ { "id": "AN-03", "tier": "T2", "active": true } ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default = "default_roster")]
    pub roster:     Vec<Analyst>,
}

fn default_roster() -> Vec<Analyst> {
    vec![
        Analyst {
            id:     "AN-01".to_string(),
            email:  Some("analyst@bank.com".to_string()),
            tier:   Tier::T1,
            active: true,
        },
        Analyst {
            id:     "AN-02".to_string(),
            email:  Some("analyst2@bank.com".to_string()),
            tier:   Tier::T1,
            active: true,
        },
        Analyst {
            id:     "AN-03".to_string(),
            email:  Some("senior@bank.com".to_string()),
            tier:   Tier::T2,
            active: true,
        },
    ]
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            roster:     default_roster(),
        }
    }
}

impl DeskConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Thresholds are validated on construction; this checks the roster.
    pub fn validate(&self) -> DeskResult<()> {
        let mut seen = HashSet::new();
        for analyst in &self.roster {
            if analyst.id.trim().is_empty() {
                return Err(DeskError::invalid_config("analyst id must not be empty"));
            }
            if !seen.insert(analyst.id.as_str()) {
                return Err(DeskError::invalid_config(format!(
                    "analyst {} appears twice in the roster",
                    analyst.id
                )));
            }
        }
        Ok(())
    }
}
