//! Vnd - Monetary amounts in Vietnamese Dong
//!
//! The backend stores every amount as a non-negative integer in dong.
//! The dong has no subunit in practice, so no fractional handling exists.
//! Arithmetic is explicit (`checked_*` / `saturating_*`) so settlement math
//! never wraps silently.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Non-negative amount of Vietnamese Dong
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Vnd(u64);

impl Vnd {
    pub const ZERO: Vnd = Vnd(0);

    pub const fn new(amount: u64) -> Self {
        Vnd(amount)
    }

    /// Build from signed operator input, clamping negatives to zero
    pub fn from_signed(amount: i64) -> Self {
        Vnd(amount.max(0) as u64)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Vnd) -> Option<Vnd> {
        self.0.checked_add(rhs.0).map(Vnd)
    }

    pub fn checked_sub(self, rhs: Vnd) -> Option<Vnd> {
        self.0.checked_sub(rhs.0).map(Vnd)
    }

    /// Subtract, stopping at zero
    pub fn saturating_sub(self, rhs: Vnd) -> Vnd {
        Vnd(self.0.saturating_sub(rhs.0))
    }

    /// Clamp into `[0, upper]`
    pub fn clamp_to(self, upper: Vnd) -> Vnd {
        self.min(upper)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl From<u64> for Vnd {
    fn from(amount: u64) -> Self {
        Vnd(amount)
    }
}

impl From<Vnd> for u64 {
    fn from(amount: Vnd) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Vnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, crate::CURRENCY)
    }
}
