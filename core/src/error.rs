use thiserror::Error;

use crate::case::CaseStatus;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Case '{case_id}' not found")]
    CaseNotFound { case_id: String },

    #[error("Case '{case_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        case_id: String,
        from:    CaseStatus,
        to:      CaseStatus,
    },

    #[error("Transaction '{tx_id}' not found")]
    TransactionNotFound { tx_id: String },

    #[error("Transaction '{tx_id}' already exists")]
    DuplicateTransaction { tx_id: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;

impl DeskError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }
}
