//! Deposit Types - Security amounts held in escrow per contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::money::Vnd;
use crate::RecordId;

/// Deposit placed by the borrower when the contract was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositTransaction {
    pub id: RecordId,
    pub contract_id: RecordId,
    /// Amount held in escrow
    pub amount: Vnd,
    pub deposit_date: DateTime<Utc>,
}

impl DepositTransaction {
    pub fn new(id: RecordId, contract_id: RecordId, amount: Vnd) -> Self {
        Self {
            id,
            contract_id,
            amount,
            deposit_date: Utc::now(),
        }
    }
}
