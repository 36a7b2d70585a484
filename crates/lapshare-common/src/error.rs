//! Error types for Lapshare
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::types::money::Vnd;
use crate::RecordId;

/// Result type alias using LapshareError
pub type Result<T> = std::result::Result<T, LapshareError>;

/// Unified error type for Lapshare operations
#[derive(Debug, Error)]
pub enum LapshareError {
    // Settlement validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Contract policy errors
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    // Settlement lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    // Missing records
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },

    // Backend rejected the request
    #[error("Backend rejected request ({status}): {message}")]
    Backend { status: u16, message: String },

    // Transport or backend availability errors
    #[error("Network error: {0}")]
    Network(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LapshareError {
    pub fn not_found(kind: &'static str, id: RecordId) -> Self {
        LapshareError::NotFound { kind, id }
    }

    /// Whether the operator may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            LapshareError::Network(_) => true,
            LapshareError::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Settlement figures that must not be submitted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "Settlement does not balance: used deposit {used_deposit} + extra payment {extra_payment} != compensation {compensation}"
    )]
    InvariantViolation {
        compensation: Vnd,
        used_deposit: Vnd,
        extra_payment: Vnd,
    },

    #[error("Used deposit {used_deposit} exceeds held deposit {held}")]
    ExceedsDeposit { used_deposit: Vnd, held: Vnd },

    #[error("Compensation {compensation} exceeds damage fee {damage_fee}")]
    ExceedsDamageFee { compensation: Vnd, damage_fee: Vnd },
}

/// Contract policy errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Deposit {amount} is outside {min_ratio}-{max_ratio} of item value {item_value}")]
    DepositOutOfRange {
        amount: Vnd,
        item_value: Vnd,
        min_ratio: String,
        max_ratio: String,
    },

    #[error("Item value must be positive")]
    ZeroItemValue,

    #[error("Invalid ratio bounds: min {min} > max {max}")]
    InvalidBounds { min: String, max: String },
}

/// Damage report settlement lifecycle errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Damage report {report_id} is already settled")]
    AlreadySettled { report_id: RecordId },

    #[error("Damage report {report_id} has already been reported")]
    AlreadyReported { report_id: RecordId },

    #[error("No damage report to settle")]
    NoReport,

    #[error("Settlement for report {report_id} was submitted for report {other_id}")]
    ReportMismatch { report_id: RecordId, other_id: RecordId },
}

// Implement From for common external error types
impl From<serde_json::Error> for LapshareError {
    fn from(err: serde_json::Error) -> Self {
        LapshareError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LapshareError {
    fn from(err: std::io::Error) -> Self {
        LapshareError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for LapshareError {
    fn from(err: anyhow::Error) -> Self {
        LapshareError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LapshareError::not_found("Damage report", 42);
        assert_eq!(err.to_string(), "Damage report not found: 42");
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::ExceedsDeposit {
            used_deposit: Vnd::new(600_000),
            held: Vnd::new(500_000),
        };
        assert!(err.to_string().contains("600000 VND"));
        assert!(err.to_string().contains("500000 VND"));
    }

    #[test]
    fn test_retryable() {
        assert!(LapshareError::Network("connection reset".into()).is_retryable());
        assert!(LapshareError::Backend {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!LapshareError::Backend {
            status: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!LapshareError::from(LifecycleError::NoReport).is_retryable());
    }
}
