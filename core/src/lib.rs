//! Case desk core: risk scoring, case lifecycle and analyst assignment for
//! a fraud-operations console.
//!
//! The surrounding application owns transactions, the analyst roster and the
//! audit sink; it reaches them through the traits in `transaction`, `analyst`
//! and `audit`. Everything else lives behind `engine::CaseEngine`.

pub mod analyst;
pub mod assignment;
pub mod audit;
pub mod case;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod metrics;
pub mod reasons;
pub mod risk;
pub mod rng;
pub mod sla;
pub mod snapshot;
pub mod store;
pub mod stream;
pub mod transaction;
pub mod types;
