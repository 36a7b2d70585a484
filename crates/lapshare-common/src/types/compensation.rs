//! Compensation Types - Persisted settlement of a damage report
//!
//! One compensation transaction exists per damage report. It records how the
//! damage fee was split between the held deposit and an extra payment. The
//! refund to the borrower is not stored; it is derived from the deposit.

use serde::{Deserialize, Serialize};

use crate::types::money::Vnd;
use crate::RecordId;

/// Lifecycle flag of a compensation transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationStatus {
    /// Computed, not yet recorded by staff
    #[default]
    Pending,
    /// Recorded; immutable from here on
    Done,
}

impl std::fmt::Display for CompensationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompensationStatus::Pending => write!(f, "pending"),
            CompensationStatus::Done => write!(f, "done"),
        }
    }
}

/// Settlement payload sent to the Compensation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompensationTransaction {
    pub contract_id: RecordId,
    pub user_id: RecordId,
    pub report_damage_id: RecordId,
    pub deposit_transaction_id: RecordId,
    pub compensation_amount: Vnd,
    pub used_deposit_amount: Vnd,
    pub extra_payment_required: Vnd,
    pub status: CompensationStatus,
}

impl NewCompensationTransaction {
    /// Attach the backend-assigned identifier
    pub fn into_transaction(self, id: RecordId) -> CompensationTransaction {
        CompensationTransaction {
            id,
            contract_id: self.contract_id,
            user_id: self.user_id,
            report_damage_id: self.report_damage_id,
            deposit_transaction_id: self.deposit_transaction_id,
            compensation_amount: self.compensation_amount,
            used_deposit_amount: self.used_deposit_amount,
            extra_payment_required: self.extra_payment_required,
            status: self.status,
        }
    }
}

/// Compensation transaction as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensationTransaction {
    pub id: RecordId,
    pub contract_id: RecordId,
    pub user_id: RecordId,
    pub report_damage_id: RecordId,
    pub deposit_transaction_id: RecordId,
    pub compensation_amount: Vnd,
    pub used_deposit_amount: Vnd,
    pub extra_payment_required: Vnd,
    pub status: CompensationStatus,
}

impl CompensationTransaction {
    /// Part of the held deposit returned to the borrower
    pub fn refund_to_borrower(&self, held: Vnd) -> Vnd {
        held.saturating_sub(self.used_deposit_amount)
    }

    pub fn is_done(&self) -> bool {
        self.status == CompensationStatus::Done
    }
}
