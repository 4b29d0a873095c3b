//! Synthetic transaction stream.
//!
//! Produces console-like traffic: amounts 50..=40000 and attributes drawn
//! from fixed lists. A configurable share of draws re-submits an earlier
//! transaction id with a fresh amount, exercising the upsert path.

use crate::{rng::DeskRng, transaction::Transaction, types::Timestamp};
use chrono::Duration;

const COUNTRIES: &[&str] = &["UAE", "KSA", "Qatar", "UK", "USA", "Germany", "India"];
const DEVICES: &[&str] = &["iPhone", "Android", "Windows", "Mac", "ATM", "POS"];
const CHANNELS: &[&str] = &["Mobile App", "Web", "ATM", "POS"];
const MERCHANTS: &[&str] = &[
    "Amazon",
    "Noon",
    "Apple",
    "Careem",
    "Talabat",
    "Booking.com",
    "Crypto Exchange",
];
const CARD_TYPES: &[&str] = &["VISA", "MasterCard", "AMEX"];

const MIN_AMOUNT: u64 = 50;
const MAX_AMOUNT: u64 = 40_000;

pub struct TransactionStream {
    rng:        DeskRng,
    next_seq:   u64,
    clock:      Timestamp,
    step:       Duration,
    resubmit_p: f64,
}

impl TransactionStream {
    pub fn new(seed: u64, start: Timestamp) -> Self {
        Self {
            rng:        DeskRng::new(seed),
            next_seq:   1,
            clock:      start,
            step:       Duration::seconds(1),
            resubmit_p: 0.0,
        }
    }

    /// Spacing between consecutive transaction timestamps.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step = step;
        self
    }

    /// Probability that a draw re-uses an earlier transaction id.
    pub fn with_resubmit_probability(mut self, p: f64) -> Self {
        self.resubmit_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn next_tx(&mut self) -> Transaction {
        let tx_id = if self.next_seq > 1 && self.rng.chance(self.resubmit_p) {
            let earlier = self.rng.between(1, self.next_seq - 1);
            format!("TX-{earlier:05}")
        } else {
            let id = format!("TX-{:05}", self.next_seq);
            self.next_seq += 1;
            id
        };

        let amount = self.rng.between(MIN_AMOUNT, MAX_AMOUNT) as f64;
        let tx = Transaction::new(tx_id, amount, self.clock)
            .with_country(*self.rng.pick(COUNTRIES))
            .with_device(*self.rng.pick(DEVICES))
            .with_channel(*self.rng.pick(CHANNELS))
            .with_merchant(*self.rng.pick(MERCHANTS))
            .with_card_type(*self.rng.pick(CARD_TYPES));
        self.clock += self.step;
        tx
    }
}

impl Iterator for TransactionStream {
    type Item = Transaction;

    fn next(&mut self) -> Option<Transaction> {
        Some(self.next_tx())
    }
}
