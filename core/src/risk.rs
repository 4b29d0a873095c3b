//! Risk scoring and policy classification.
//!
//! Risk is a deterministic function of the transaction amount:
//!   risk = min(100, round(amount / RISK_CAP * 100))
//!
//! Two independent policies read the score:
//!   - label (GREEN/ORANGE/RED) against the configurable alert thresholds
//!   - priority (LOW..CRITICAL) against fixed escalation bands
//!
//! Only RED opens a case. ORANGE is alerting-only.

use crate::{
    error::{DeskError, DeskResult},
    reasons,
    transaction::Transaction,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference ceiling: amounts at or above this score 100.
pub const RISK_CAP: f64 = 40_000.0;

// Fixed escalation bands, independent of the alert thresholds.
const CRITICAL_FLOOR: u8 = 90;
const HIGH_FLOOR: u8 = 75;
const MEDIUM_FLOOR: u8 = 55;

/// Score a transaction. Total: negative, zero and NaN amounts score 0.
pub fn score(tx: &Transaction) -> u8 {
    score_amount(tx.amount)
}

pub fn score_amount(amount: f64) -> u8 {
    if !(amount > 0.0) {
        return 0;
    }
    let raw = (amount / RISK_CAP * 100.0).round();
    raw.min(100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Green,
    Orange,
    Red,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green  => "GREEN",
            Self::Orange => "ORANGE",
            Self::Red    => "RED",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn from_risk(risk: u8) -> Self {
        match risk {
            r if r >= CRITICAL_FLOOR => Self::Critical,
            r if r >= HIGH_FLOOR     => Self::High,
            r if r >= MEDIUM_FLOOR   => Self::Medium,
            _                        => Self::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low      => "LOW",
            Self::Medium   => "MEDIUM",
            Self::High     => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW"      => Some(Self::Low),
            "MEDIUM"   => Some(Self::Medium),
            "HIGH"     => Some(Self::High),
            "CRITICAL" => Some(Self::Critical),
            _          => None,
        }
    }

    /// HIGH and CRITICAL work is restricted to T2 analysts.
    pub fn requires_senior(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert thresholds. Invariant: 1 <= orange <= 99, 1 <= red <= 100, orange < red.
///
/// Fields are private so an invalid pair can never be constructed;
/// deserialization goes through the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds", into = "RawThresholds")]
pub struct Thresholds {
    orange: u8,
    red:    u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThresholds {
    orange_threshold: i64,
    red_threshold:    i64,
}

impl Thresholds {
    pub fn new(orange: i64, red: i64) -> DeskResult<Self> {
        if !(1..=99).contains(&orange) {
            return Err(DeskError::invalid_config(format!(
                "orange threshold must be 1..99, got {orange}"
            )));
        }
        if !(1..=100).contains(&red) {
            return Err(DeskError::invalid_config(format!(
                "red threshold must be 1..100, got {red}"
            )));
        }
        if red <= orange {
            return Err(DeskError::invalid_config(format!(
                "red threshold ({red}) must be greater than orange ({orange})"
            )));
        }
        Ok(Self { orange: orange as u8, red: red as u8 })
    }

    pub fn orange(&self) -> u8 { self.orange }
    pub fn red(&self)    -> u8 { self.red }

    /// The RED threshold gates case creation.
    pub fn opens_case(&self, risk: u8) -> bool {
        risk >= self.red
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { orange: 40, red: 70 }
    }
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = DeskError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Thresholds::new(raw.orange_threshold, raw.red_threshold)
    }
}

impl From<Thresholds> for RawThresholds {
    fn from(t: Thresholds) -> Self {
        Self {
            orange_threshold: t.orange as i64,
            red_threshold:    t.red as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub label:    RiskLabel,
    pub priority: Priority,
}

pub fn classify(risk: u8, thresholds: &Thresholds) -> Classification {
    let label = if risk >= thresholds.red {
        RiskLabel::Red
    } else if risk >= thresholds.orange {
        RiskLabel::Orange
    } else {
        RiskLabel::Green
    };
    Classification { label, priority: Priority::from_risk(risk) }
}

/// Derived view of one transaction; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score:   u8,
    pub label:        RiskLabel,
    pub priority:     Priority,
    pub reason_codes: Vec<String>,
}

pub fn assess(tx: &Transaction, thresholds: &Thresholds) -> RiskAssessment {
    let risk = score(tx);
    let Classification { label, priority } = classify(risk, thresholds);
    RiskAssessment {
        risk_score: risk,
        label,
        priority,
        reason_codes: reasons::reasons(tx, risk, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_clamps_at_both_ends() {
        assert_eq!(score_amount(-50.0), 0);
        assert_eq!(score_amount(0.0), 0);
        assert_eq!(score_amount(f64::NAN), 0);
        assert_eq!(score_amount(RISK_CAP), 100);
        assert_eq!(score_amount(RISK_CAP * 3.0), 100);
    }

    #[test]
    fn score_rounds_half_up() {
        // 200 / 40000 * 100 = 0.5
        assert_eq!(score_amount(200.0), 1);
        assert_eq!(score_amount(199.0), 0);
        assert_eq!(score_amount(12_000.0), 30);
    }

    #[test]
    fn score_is_monotonic_in_amount() {
        let mut last = 0;
        let mut amount = 0.0;
        while amount <= 45_000.0 {
            let s = score_amount(amount);
            assert!(s >= last, "score dropped at amount {amount}: {s} < {last}");
            last = s;
            amount += 37.5;
        }
    }

    #[test]
    fn priority_bands_are_fixed() {
        assert_eq!(Priority::from_risk(100), Priority::Critical);
        assert_eq!(Priority::from_risk(90), Priority::Critical);
        assert_eq!(Priority::from_risk(89), Priority::High);
        assert_eq!(Priority::from_risk(75), Priority::High);
        assert_eq!(Priority::from_risk(74), Priority::Medium);
        assert_eq!(Priority::from_risk(55), Priority::Medium);
        assert_eq!(Priority::from_risk(54), Priority::Low);
        assert_eq!(Priority::from_risk(0), Priority::Low);
    }

    #[test]
    fn label_follows_thresholds() {
        let t = Thresholds::new(40, 70).unwrap();
        assert_eq!(classify(39, &t).label, RiskLabel::Green);
        assert_eq!(classify(40, &t).label, RiskLabel::Orange);
        assert_eq!(classify(69, &t).label, RiskLabel::Orange);
        assert_eq!(classify(70, &t).label, RiskLabel::Red);
    }

    #[test]
    fn thresholds_reject_bad_pairs() {
        assert!(Thresholds::new(80, 70).is_err());
        assert!(Thresholds::new(70, 70).is_err());
        assert!(Thresholds::new(0, 70).is_err());
        assert!(Thresholds::new(100, 100).is_err());
        assert!(Thresholds::new(40, 101).is_err());
        assert!(Thresholds::new(99, 100).is_ok());
    }

    #[test]
    fn thresholds_deserialize_through_validation() {
        let ok: Thresholds =
            serde_json::from_str(r#"{"orangeThreshold":30,"redThreshold":60}"#).unwrap();
        assert_eq!((ok.orange(), ok.red()), (30, 60));

        let bad = serde_json::from_str::<Thresholds>(r#"{"orangeThreshold":80,"redThreshold":70}"#);
        assert!(bad.is_err(), "inverted thresholds must not deserialize");
    }
}
