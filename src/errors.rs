use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the ledger, storage, and service layers.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Batch insert incomplete: {persisted} of {expected} installments persisted")]
    PartialBatch { expected: usize, persisted: usize },
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, PlannerError>;

impl PlannerError {
    /// Returns true for errors raised before anything was sent to the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PlannerError::InvalidInput(_)
                | PlannerError::InvalidDate(_)
                | PlannerError::CardNotFound(_)
        )
    }

    /// Message suitable for end users. Store failures collapse into a generic
    /// notice; validation problems keep their detail.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::StorageError(_) | PlannerError::PartialBatch { .. } => {
                "Could not save or load your data. Please try again.".into()
            }
            PlannerError::TransactionNotFound(_) => "Transaction not found.".into(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(err: std::io::Error) -> Self {
        PlannerError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::StorageError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_hide_backend_detail() {
        let err = PlannerError::StorageError("connection reset by peer".into());
        assert!(!err.user_message().contains("peer"));
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_errors_keep_detail() {
        let err = PlannerError::InvalidInput("amount must be positive".into());
        assert!(err.is_validation());
        assert!(err.user_message().contains("amount must be positive"));
    }
}
