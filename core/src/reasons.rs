//! Reason codes: short justifications shown next to a case.
//!
//! Rules run in a fixed order and each appends at most one code.
//! Fewer than two codes get the generic fallback; output is capped at five.

use crate::{risk::Thresholds, transaction::Transaction};

/// Transactions originating here are not "foreign".
pub const HOME_COUNTRY: &str = "UAE";

const HIGH_AMOUNT: f64 = 15_000.0;
const MAX_REASONS: usize = 5;
const FALLBACK: &str = "Anomalous pattern detected";

pub fn reasons(tx: &Transaction, risk: u8, thresholds: &Thresholds) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_REASONS);

    if risk >= thresholds.red() {
        out.push(format!("Risk above RED threshold({})", thresholds.red()));
    } else if risk >= thresholds.orange() {
        out.push(format!("Risk above ORANGE threshold({})", thresholds.orange()));
    }

    if tx.amount >= HIGH_AMOUNT {
        out.push("High amount".to_string());
    }

    if let Some(country) = tx.country.as_deref() {
        if !country.is_empty() && country != HOME_COUNTRY {
            out.push("Foreign origin detected".to_string());
        }
    }

    if tx
        .merchant
        .as_deref()
        .is_some_and(|m| m.to_lowercase().contains("crypto"))
    {
        out.push("High-risk merchant category".to_string());
    }

    let is_atm = |v: &Option<String>| v.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("ATM"));
    if is_atm(&tx.device) || is_atm(&tx.channel) {
        out.push("ATM channel/device risk".to_string());
    }

    if out.len() < 2 {
        out.push(FALLBACK.to_string());
    }
    out.truncate(MAX_REASONS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tx(amount: f64) -> Transaction {
        Transaction::new("TX-1", amount, Utc::now())
    }

    #[test]
    fn quiet_transaction_gets_fallback_only() {
        let t = Thresholds::default();
        let r = reasons(&tx(100.0).with_country(HOME_COUNTRY), 0, &t);
        assert_eq!(r, vec![FALLBACK.to_string()]);
    }

    #[test]
    fn single_rule_gets_fallback_appended() {
        let t = Thresholds::default();
        let r = reasons(&tx(100.0), 50, &t);
        assert_eq!(r, vec!["Risk above ORANGE threshold(40)".to_string(), FALLBACK.to_string()]);
    }

    #[test]
    fn every_rule_fires_in_order_and_caps_at_five() {
        let t = Thresholds::default();
        let full = tx(40_000.0)
            .with_country("US")
            .with_merchant("Crypto Exchange")
            .with_device("atm");
        let r = reasons(&full, 100, &t);
        assert_eq!(
            r,
            vec![
                "Risk above RED threshold(70)",
                "High amount",
                "Foreign origin detected",
                "High-risk merchant category",
                "ATM channel/device risk",
            ]
        );
    }

    #[test]
    fn channel_alone_triggers_atm_rule() {
        let t = Thresholds::default();
        let r = reasons(&tx(10.0).with_channel("ATM").with_country(HOME_COUNTRY), 0, &t);
        assert_eq!(r, vec!["ATM channel/device risk".to_string(), FALLBACK.to_string()]);
    }

    #[test]
    fn codes_are_unique() {
        let t = Thresholds::default();
        let r = reasons(&tx(30_000.0).with_channel("ATM").with_device("ATM"), 75, &t);
        let mut dedup = r.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), r.len(), "duplicate reason codes: {r:?}");
    }
}
