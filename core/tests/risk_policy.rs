//! Risk scoring and policy classification over realistic transactions.

use casedesk_core::{
    config::DeskConfig,
    risk::{self, Priority, RiskLabel, Thresholds},
    sla,
    transaction::Transaction,
    types::Timestamp,
};
use chrono::{TimeZone, Utc};

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

#[test]
fn score_is_monotonic_and_bounded() {
    let mut last = 0;
    let mut amount = 0.0;
    while amount <= 60_000.0 {
        let s = risk::score_amount(amount);
        assert!(s <= 100, "score {s} out of range for {amount}");
        assert!(s >= last, "score dropped from {last} to {s} at {amount}");
        last = s;
        amount += 137.0;
    }
    assert_eq!(last, 100);
}

#[test]
fn priority_bands_are_independent_of_thresholds() {
    let strict = Thresholds::new(10, 20).unwrap();
    let loose = Thresholds::new(80, 95).unwrap();
    for (risk, expected) in [
        (100, Priority::Critical),
        (90, Priority::Critical),
        (89, Priority::High),
        (75, Priority::High),
        (74, Priority::Medium),
        (55, Priority::Medium),
        (54, Priority::Low),
        (0, Priority::Low),
    ] {
        assert_eq!(risk::classify(risk, &strict).priority, expected, "risk {risk}");
        assert_eq!(risk::classify(risk, &loose).priority, expected, "risk {risk}");
    }
}

#[test]
fn labels_follow_thresholds() {
    let t = Thresholds::default();
    assert_eq!(risk::classify(39, &t).label, RiskLabel::Green);
    assert_eq!(risk::classify(40, &t).label, RiskLabel::Orange);
    assert_eq!(risk::classify(69, &t).label, RiskLabel::Orange);
    assert_eq!(risk::classify(70, &t).label, RiskLabel::Red);
    assert!(!t.opens_case(69));
    assert!(t.opens_case(70));
}

#[test]
fn assessment_of_a_quiet_domestic_payment() {
    let tx = Transaction::new("TX-Q", 2_000.0, t0())
        .with_country("UAE")
        .with_merchant("Noon")
        .with_channel("Mobile App");
    let a = risk::assess(&tx, &Thresholds::default());
    assert_eq!(a.risk_score, 5);
    assert_eq!(a.label, RiskLabel::Green);
    assert_eq!(a.priority, Priority::Low);
    assert_eq!(a.reason_codes, vec!["Anomalous pattern detected"]);
}

#[test]
fn assessment_of_a_crypto_atm_withdrawal() {
    let tx = Transaction::new("TX-Z", 16_400.0, t0())
        .with_country("UAE")
        .with_merchant("Crypto Exchange")
        .with_device("ATM");
    let a = risk::assess(&tx, &Thresholds::default());
    assert_eq!(a.risk_score, 41);
    assert_eq!(a.label, RiskLabel::Orange);
    assert_eq!(
        a.reason_codes,
        vec![
            "Risk above ORANGE threshold(40)",
            "High amount",
            "High-risk merchant category",
            "ATM channel/device risk",
        ]
    );
}

#[test]
fn rejected_thresholds_never_build() {
    for (orange, red) in [(80, 70), (70, 70), (0, 50), (100, 100), (40, 101), (-5, 60)] {
        assert!(Thresholds::new(orange, red).is_err(), "({orange}, {red}) accepted");
    }
    let edge = Thresholds::new(99, 100).unwrap();
    assert_eq!((edge.orange(), edge.red()), (99, 100));
}

#[test]
fn config_rejects_bad_thresholds_and_rosters() {
    let bad: Result<DeskConfig, _> = serde_json::from_str(
        r#"{"thresholds":{"orangeThreshold":80,"redThreshold":70}}"#,
    );
    assert!(bad.is_err(), "inverted thresholds must not deserialize");

    let defaulted: DeskConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaulted.thresholds, Thresholds::default());
    assert_eq!(defaulted.roster.len(), 3);
    defaulted.validate().unwrap();

    let dup: DeskConfig = serde_json::from_str(
        r#"{"roster":[{"id":"AN-01","tier":"T1","active":true},
                      {"id":"AN-01","tier":"T2","active":true}]}"#,
    )
    .unwrap();
    assert!(dup.validate().is_err(), "duplicate analyst ids must be rejected");
}

#[test]
fn sla_minutes_are_whole_and_never_negative() {
    let due = sla::due_at(Priority::Critical, t0());
    assert_eq!(sla::minutes_remaining(due, t0()), 60);
    assert_eq!(sla::minutes_remaining(due, t0() + chrono::Duration::seconds(90)), 58);
    assert_eq!(sla::minutes_remaining(due, t0() + chrono::Duration::hours(3)), 0);
    assert!(sla::is_overdue(due, t0() + chrono::Duration::hours(3)));
    assert!(sla::is_due_soon(due, t0() + chrono::Duration::hours(3)));
}
