//! Contract Types - Loan contracts and the policies attached to them
//!
//! A borrower signs a contract for one laptop. At creation the borrower places
//! a security deposit in escrow, sized between 10% and 30% of the item value.
//! When the item comes back damaged, the assessed fee is capped at the item
//! value before it is settled against the deposit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PolicyError;
use crate::types::money::Vnd;
use crate::RecordId;

/// Default minimum deposit as a share of item value (10%)
pub const DEFAULT_MIN_DEPOSIT_RATIO: Decimal = dec!(0.10);

/// Default maximum deposit as a share of item value (30%)
pub const DEFAULT_MAX_DEPOSIT_RATIO: Decimal = dec!(0.30);

/// Loan contract between the marketplace and a borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: RecordId,
    /// Borrower
    pub user_id: RecordId,
    pub item_id: RecordId,
    /// Reference value of the laptop
    pub item_value: Vnd,
    pub expected_return_date: DateTime<Utc>,
    #[serde(default)]
    pub terms: String,
}

/// One borrow of an item under a contract
///
/// Damage reports point at a borrow history entry, which links them to the
/// contract and the borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowHistory {
    pub id: RecordId,
    pub contract_id: RecordId,
    pub user_id: RecordId,
    pub item_id: RecordId,
    pub borrow_date: DateTime<Utc>,
    #[serde(default)]
    pub return_date: Option<DateTime<Utc>>,
}

/// Deposit sizing rule enforced at contract creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPolicy {
    pub min_ratio: Decimal,
    pub max_ratio: Decimal,
}

impl Default for DepositPolicy {
    fn default() -> Self {
        Self {
            min_ratio: DEFAULT_MIN_DEPOSIT_RATIO,
            max_ratio: DEFAULT_MAX_DEPOSIT_RATIO,
        }
    }
}

impl DepositPolicy {
    pub fn new(min_ratio: Decimal, max_ratio: Decimal) -> Result<Self, PolicyError> {
        if min_ratio > max_ratio || min_ratio < Decimal::ZERO || max_ratio > Decimal::ONE {
            return Err(PolicyError::InvalidBounds {
                min: min_ratio.to_string(),
                max: max_ratio.to_string(),
            });
        }
        Ok(Self {
            min_ratio,
            max_ratio,
        })
    }

    /// Smallest acceptable deposit for an item, rounded up to whole dong
    pub fn min_deposit(&self, item_value: Vnd) -> Vnd {
        Self::to_vnd(
            item_value
                .to_decimal()
                .checked_mul(self.min_ratio)
                .map(|amount| amount.ceil()),
        )
    }

    /// Largest acceptable deposit for an item, rounded down to whole dong
    pub fn max_deposit(&self, item_value: Vnd) -> Vnd {
        Self::to_vnd(
            item_value
                .to_decimal()
                .checked_mul(self.max_ratio)
                .map(|amount| amount.floor()),
        )
    }

    /// Check a deposit amount against the item value
    pub fn check(&self, item_value: Vnd, amount: Vnd) -> Result<(), PolicyError> {
        if item_value.is_zero() {
            return Err(PolicyError::ZeroItemValue);
        }

        let ratio = amount.to_decimal() / item_value.to_decimal();
        debug!(%item_value, %amount, %ratio, "Checking deposit ratio");

        if ratio < self.min_ratio || ratio > self.max_ratio {
            return Err(PolicyError::DepositOutOfRange {
                amount,
                item_value,
                min_ratio: self.min_ratio.to_string(),
                max_ratio: self.max_ratio.to_string(),
            });
        }
        Ok(())
    }

    /// Overflowing products saturate
    fn to_vnd(amount: Option<Decimal>) -> Vnd {
        amount
            .and_then(|amount| u64::try_from(amount).ok())
            .map_or(Vnd::new(u64::MAX), Vnd::new)
    }
}

/// Upper bound applied to an assessed damage fee before settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageFeePolicy {
    /// Cap the fee at the item value
    pub cap_at_item_value: bool,
}

impl Default for DamageFeePolicy {
    fn default() -> Self {
        Self {
            cap_at_item_value: true,
        }
    }
}

impl DamageFeePolicy {
    /// Fee that is actually settled
    pub fn settled_fee(&self, damage_fee: Vnd, item_value: Vnd) -> Vnd {
        if self.cap_at_item_value {
            damage_fee.clamp_to(item_value)
        } else {
            damage_fee
        }
    }
}
