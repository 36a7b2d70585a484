//! Damage Report Types
//!
//! Staff inspect a laptop when it comes back and record the damage fee along
//! with the condition before the borrow and after the return. A zero fee
//! still produces a report: the deposit return is settled explicitly.

use serde::{Deserialize, Serialize};

use crate::types::contract::{Contract, DamageFeePolicy};
use crate::types::money::Vnd;
use crate::RecordId;

/// Damage report recorded for a returned item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub report_id: RecordId,
    pub item_id: RecordId,
    pub borrow_history_id: RecordId,
    /// Assessed fee, zero when no damage was found
    pub damage_fee: Vnd,
    #[serde(default)]
    pub condition_before_borrow: String,
    #[serde(default)]
    pub condition_after_return: String,
    #[serde(default)]
    pub note: String,
}

impl DamageReport {
    pub fn has_damage(&self) -> bool {
        !self.damage_fee.is_zero()
    }

    /// Pair the assessed fee with the contract's item value
    pub fn assess(&self, contract: &Contract) -> DamageAssessment {
        DamageAssessment {
            damage_fee: self.damage_fee,
            item_value: contract.item_value,
        }
    }
}

/// Damage fee together with the value of the damaged item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageAssessment {
    pub damage_fee: Vnd,
    pub item_value: Vnd,
}

impl DamageAssessment {
    /// Fee handed to the settlement calculator
    pub fn settled_fee(&self, policy: &DamageFeePolicy) -> Vnd {
        policy.settled_fee(self.damage_fee, self.item_value)
    }
}
