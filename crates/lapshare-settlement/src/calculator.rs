//! Settlement Calculator - Deposit vs. damage fee split
//!
//! Given the damage fee assessed on a returned laptop and the deposit held in
//! escrow, decide how much of the deposit compensates the lender, how much goes
//! back to the borrower, and how much the borrower still owes:
//!
//! ```text
//! fee == 0            -> used = 0,    extra = 0,          refund = held
//! 0 < fee < held      -> used = fee,  extra = 0,          refund = held - fee
//! fee >= held         -> used = held, extra = fee - held, refund = 0
//! ```
//!
//! Every [`SettlementResult`] satisfies
//! `used + extra == compensation` and `used + refund == held`.
//! Results are only built by [`compute_default_settlement`] and
//! [`revise_settlement`]; operator-edited numbers travel as
//! [`SettlementFigures`] and go through [`validate_before_submit`].

use lapshare_common::{CompensationStatus, ValidationError, Vnd};
use serde::{Deserialize, Serialize, Serializer};

/// The three numbers an operator can edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementFigures {
    /// Total owed to the lender for the damage
    pub compensation_amount: Vnd,
    /// Part of the held deposit applied to the compensation
    pub used_deposit_amount: Vnd,
    /// Amount owed beyond the deposit
    pub extra_payment_required: Vnd,
}

/// Field edited by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettlementField {
    CompensationAmount,
    UsedDepositAmount,
    ExtraPaymentRequired,
}

/// Explanation attached to a settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettlementNote {
    NoDamage,
    PartialRefund,
    ExtraPaymentRequired,
}

impl SettlementNote {
    pub fn message(&self) -> &'static str {
        match self {
            SettlementNote::NoDamage => "No damage fee. Full deposit will be returned to customer.",
            SettlementNote::PartialRefund => {
                "Damage fee is less than deposit. Partial deposit will be returned."
            }
            SettlementNote::ExtraPaymentRequired => {
                "Damage fee exceeds deposit. Additional payment required."
            }
        }
    }

    fn for_figures(figures: &SettlementFigures, refund: Vnd) -> Option<Self> {
        if figures.compensation_amount.is_zero() {
            Some(SettlementNote::NoDamage)
        } else if !figures.extra_payment_required.is_zero() {
            Some(SettlementNote::ExtraPaymentRequired)
        } else if !refund.is_zero() {
            Some(SettlementNote::PartialRefund)
        } else {
            None
        }
    }
}

impl std::fmt::Display for SettlementNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for SettlementNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Consistent settlement of a damage report against a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    #[serde(flatten)]
    figures: SettlementFigures,
    refund_to_borrower: Vnd,
    note: Option<SettlementNote>,
    status: CompensationStatus,
}

impl SettlementResult {
    /// Build from figures that already balance against `held`
    fn balanced(figures: SettlementFigures, held: Vnd) -> Self {
        debug_assert!(figures.used_deposit_amount <= held);
        debug_assert_eq!(
            figures
                .used_deposit_amount
                .checked_add(figures.extra_payment_required),
            Some(figures.compensation_amount)
        );

        let refund_to_borrower = held.saturating_sub(figures.used_deposit_amount);
        Self {
            figures,
            refund_to_borrower,
            note: SettlementNote::for_figures(&figures, refund_to_borrower),
            status: CompensationStatus::Pending,
        }
    }

    pub fn figures(&self) -> &SettlementFigures {
        &self.figures
    }

    pub fn compensation_amount(&self) -> Vnd {
        self.figures.compensation_amount
    }

    pub fn used_deposit_amount(&self) -> Vnd {
        self.figures.used_deposit_amount
    }

    pub fn extra_payment_required(&self) -> Vnd {
        self.figures.extra_payment_required
    }

    pub fn refund_to_borrower(&self) -> Vnd {
        self.refund_to_borrower
    }

    pub fn note(&self) -> Option<SettlementNote> {
        self.note
    }

    pub fn status(&self) -> CompensationStatus {
        self.status
    }

    /// Mark as recorded once the compensation transaction is persisted
    pub fn into_done(self) -> Self {
        Self {
            status: CompensationStatus::Done,
            ..self
        }
    }
}

/// Default split of a damage fee against the held deposit
pub fn compute_default_settlement(damage_fee: Vnd, held_amount: Vnd) -> SettlementResult {
    let figures = if damage_fee.is_zero() {
        SettlementFigures::default()
    } else if damage_fee < held_amount {
        SettlementFigures {
            compensation_amount: damage_fee,
            used_deposit_amount: damage_fee,
            extra_payment_required: Vnd::ZERO,
        }
    } else {
        // fee >= held, so the subtraction is exact
        SettlementFigures {
            compensation_amount: damage_fee,
            used_deposit_amount: held_amount,
            extra_payment_required: damage_fee.saturating_sub(held_amount),
        }
    };

    SettlementResult::balanced(figures, held_amount)
}

/// Apply an operator edit to one field and recompute the others
///
/// `new_value` is raw operator input; negatives clamp to zero. The current
/// compensation is held within `[0, damage_fee]`.
pub fn revise_settlement(
    current: &SettlementFigures,
    edited_field: SettlementField,
    new_value: i64,
    damage_fee: Vnd,
    held_amount: Vnd,
) -> SettlementResult {
    let requested = Vnd::from_signed(new_value);
    let compensation = current.compensation_amount.clamp_to(damage_fee);

    let (compensation, used) = match edited_field {
        SettlementField::CompensationAmount => {
            let compensation = requested.clamp_to(damage_fee);
            (compensation, held_amount.min(compensation))
        }
        SettlementField::UsedDepositAmount => {
            (compensation, requested.clamp_to(held_amount.min(compensation)))
        }
        SettlementField::ExtraPaymentRequired => {
            let used = held_amount.min(compensation.saturating_sub(requested));
            (compensation, used)
        }
    };

    let figures = SettlementFigures {
        compensation_amount: compensation,
        used_deposit_amount: used,
        extra_payment_required: compensation.saturating_sub(used),
    };

    SettlementResult::balanced(figures, held_amount)
}

/// Check operator figures right before they are persisted
pub fn validate_before_submit(
    figures: &SettlementFigures,
    damage_fee: Vnd,
    held_amount: Vnd,
) -> Result<(), ValidationError> {
    let total = figures
        .used_deposit_amount
        .checked_add(figures.extra_payment_required);
    if total != Some(figures.compensation_amount) {
        return Err(ValidationError::InvariantViolation {
            compensation: figures.compensation_amount,
            used_deposit: figures.used_deposit_amount,
            extra_payment: figures.extra_payment_required,
        });
    }

    if figures.used_deposit_amount > held_amount {
        return Err(ValidationError::ExceedsDeposit {
            used_deposit: figures.used_deposit_amount,
            held: held_amount,
        });
    }

    if figures.compensation_amount > damage_fee {
        return Err(ValidationError::ExceedsDamageFee {
            compensation: figures.compensation_amount,
            damage_fee,
        });
    }

    Ok(())
}
