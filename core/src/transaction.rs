//! Transactions and the ledger seam.
//!
//! Transactions are owned by the upstream ledger. The desk only reads them:
//! it never mutates a transaction once created.

use crate::{
    error::{DeskError, DeskResult},
    types::{Timestamp, TxId},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id:     TxId,
    pub amount:    f64,
    #[serde(default)]
    pub country:   Option<String>,
    #[serde(default)]
    pub merchant:  Option<String>,
    #[serde(default)]
    pub channel:   Option<String>,
    #[serde(default)]
    pub device:    Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    pub timestamp: Timestamp,
}

impl Transaction {
    pub fn new(tx_id: impl Into<TxId>, amount: f64, timestamp: Timestamp) -> Self {
        Self {
            tx_id: tx_id.into(),
            amount,
            country: None,
            merchant: None,
            channel: None,
            device: None,
            card_type: None,
            timestamp,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    pub fn with_card_type(mut self, card_type: impl Into<String>) -> Self {
        self.card_type = Some(card_type.into());
        self
    }
}

/// Read access to the upstream transaction ledger.
pub trait TransactionSource: Send + Sync {
    /// All transactions in stream order (oldest first).
    fn list_transactions(&self) -> DeskResult<Vec<Transaction>>;

    fn get_transaction(&self, tx_id: &str) -> DeskResult<Option<Transaction>>;

    fn create_transaction(&self, tx: Transaction) -> DeskResult<Transaction>;
}

/// Process-local ledger. Keeps insertion order; ids are unique.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    txs: RwLock<Vec<Transaction>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.txs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.read().is_empty()
    }
}

impl TransactionSource for InMemoryLedger {
    fn list_transactions(&self) -> DeskResult<Vec<Transaction>> {
        let mut out = self.txs.read().clone();
        // Stable sort: equal timestamps keep insertion order.
        out.sort_by_key(|t| t.timestamp);
        Ok(out)
    }

    fn get_transaction(&self, tx_id: &str) -> DeskResult<Option<Transaction>> {
        Ok(self.txs.read().iter().find(|t| t.tx_id == tx_id).cloned())
    }

    fn create_transaction(&self, tx: Transaction) -> DeskResult<Transaction> {
        let mut txs = self.txs.write();
        if txs.iter().any(|t| t.tx_id == tx.tx_id) {
            return Err(DeskError::DuplicateTransaction { tx_id: tx.tx_id });
        }
        txs.push(tx.clone());
        Ok(tx)
    }
}
