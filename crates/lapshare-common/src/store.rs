//! Backend Stores
//!
//! Async contracts for the collaborating services that own contracts, deposits,
//! damage reports, and compensation transactions. Lookups return `Ok(None)`
//! when the record does not exist; errors are reserved for transport and
//! backend failures.

use async_trait::async_trait;

use crate::types::{
    compensation::{CompensationTransaction, NewCompensationTransaction},
    contract::{BorrowHistory, Contract},
    damage_report::DamageReport,
    deposit::DepositTransaction,
};
use crate::{RecordId, Result};

/// Contract service
#[async_trait]
pub trait ContractStore: Send + Sync {
    /// Get a contract by ID
    async fn get_contract(&self, id: RecordId) -> Result<Option<Contract>>;

    /// Get a borrow history entry by ID
    async fn get_borrow_history(&self, id: RecordId) -> Result<Option<BorrowHistory>>;
}

/// Deposit service
#[async_trait]
pub trait DepositStore: Send + Sync {
    /// Get the deposit held for a contract
    async fn deposit_for_contract(&self, contract_id: RecordId)
        -> Result<Option<DepositTransaction>>;
}

/// Damage report service
#[async_trait]
pub trait DamageReportStore: Send + Sync {
    /// Get a damage report by ID
    async fn get_damage_report(&self, report_id: RecordId) -> Result<Option<DamageReport>>;
}

/// Compensation service
#[async_trait]
pub trait CompensationStore: Send + Sync {
    /// Get the compensation transaction recorded for a damage report
    async fn compensation_for_report(
        &self,
        report_id: RecordId,
    ) -> Result<Option<CompensationTransaction>>;

    /// Persist a new compensation transaction
    ///
    /// Fails with `LifecycleError::AlreadySettled` when the report already
    /// has one.
    async fn create_compensation(
        &self,
        transaction: NewCompensationTransaction,
    ) -> Result<CompensationTransaction>;
}

/// Every service the settlement workflow talks to
pub trait MarketplaceBackend:
    ContractStore + DepositStore + DamageReportStore + CompensationStore
{
}

impl<T> MarketplaceBackend for T where
    T: ContractStore + DepositStore + DamageReportStore + CompensationStore
{
}
