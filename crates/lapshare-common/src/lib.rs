//! # Lapshare Common
//!
//! Shared types, errors, and backend contracts for the Lapshare laptop marketplace.
//!
//! ## Core Types
//!
//! - [`Vnd`]: Non-negative amount of Vietnamese Dong (no subunit)
//! - [`Contract`]/[`BorrowHistory`]: Loan contract and the borrow it produced
//! - [`DepositTransaction`]: Security deposit held in escrow per contract
//! - [`DamageReport`]: Damage assessed when a borrowed item comes back
//! - [`CompensationTransaction`]: Persisted settlement of a damage report
//!
//! ## Policies
//!
//! - [`DepositPolicy`]: Deposit must be 10-30% of the item value
//! - [`DamageFeePolicy`]: Damage fee is capped at the item value
//!
//! ## Stores
//!
//! - [`store`]: Async traits for the collaborating Contract, Deposit,
//!   Damage report, and Compensation services

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{LapshareError, LifecycleError, PolicyError, Result, ValidationError};
pub use store::{
    CompensationStore, ContractStore, DamageReportStore, DepositStore, MarketplaceBackend,
};
pub use types::{
    compensation::{CompensationStatus, CompensationTransaction, NewCompensationTransaction},
    contract::{BorrowHistory, Contract, DamageFeePolicy, DepositPolicy},
    damage_report::{DamageAssessment, DamageReport},
    deposit::DepositTransaction,
    money::Vnd,
};

/// Identifier type used by the backend for every record
pub type RecordId = i64;

/// Lapshare version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Currency code for all monetary amounts
pub const CURRENCY: &str = "VND";
