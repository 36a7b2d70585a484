//! In-memory backend
//!
//! Stands in for the remote Contract, Deposit, Damage report, and Compensation
//! services in tests and local runs.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lapshare_common::{
    BorrowHistory, CompensationStore, CompensationTransaction, Contract, ContractStore,
    DamageReport, DamageReportStore, DepositPolicy, DepositStore, DepositTransaction,
    LapshareError, LifecycleError, NewCompensationTransaction, RecordId, Result, Vnd,
};
use tracing::debug;

/// In-memory marketplace backend
///
/// Uses DashMap for concurrent access. Compensation transactions are keyed by
/// damage report so a report can only be settled once.
pub struct InMemoryBackend {
    contracts: DashMap<RecordId, Contract>,
    borrow_histories: DashMap<RecordId, BorrowHistory>,
    /// Deposits by contract
    deposits: DashMap<RecordId, DepositTransaction>,
    reports: DashMap<RecordId, DamageReport>,
    /// Compensation transactions by damage report
    compensations: DashMap<RecordId, CompensationTransaction>,
    deposit_policy: DepositPolicy,
    next_id: AtomicI64,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_policy(DepositPolicy::default())
    }

    pub fn with_policy(deposit_policy: DepositPolicy) -> Self {
        Self {
            contracts: DashMap::new(),
            borrow_histories: DashMap::new(),
            deposits: DashMap::new(),
            reports: DashMap::new(),
            compensations: DashMap::new(),
            deposit_policy,
            next_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> RecordId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn insert_contract(&self, contract: Contract) {
        self.contracts.insert(contract.id, contract);
    }

    pub fn insert_borrow_history(&self, history: BorrowHistory) {
        self.borrow_histories.insert(history.id, history);
    }

    pub fn insert_damage_report(&self, report: DamageReport) {
        self.reports.insert(report.report_id, report);
    }

    /// Hold a deposit for a contract, checked against the deposit policy
    pub fn record_deposit(&self, contract_id: RecordId, amount: Vnd) -> Result<DepositTransaction> {
        let item_value = self
            .contracts
            .get(&contract_id)
            .map(|c| c.item_value)
            .ok_or_else(|| LapshareError::not_found("Contract", contract_id))?;

        self.deposit_policy.check(item_value, amount)?;

        let deposit = DepositTransaction::new(self.next_id(), contract_id, amount);
        debug!(contract_id, deposit_id = deposit.id, %amount, "Deposit recorded");
        self.deposits.insert(contract_id, deposit.clone());
        Ok(deposit)
    }

    pub fn compensation_count(&self) -> usize {
        self.compensations.len()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContractStore for InMemoryBackend {
    async fn get_contract(&self, id: RecordId) -> Result<Option<Contract>> {
        Ok(self.contracts.get(&id).map(|c| c.clone()))
    }

    async fn get_borrow_history(&self, id: RecordId) -> Result<Option<BorrowHistory>> {
        Ok(self.borrow_histories.get(&id).map(|h| h.clone()))
    }
}

#[async_trait]
impl DepositStore for InMemoryBackend {
    async fn deposit_for_contract(
        &self,
        contract_id: RecordId,
    ) -> Result<Option<DepositTransaction>> {
        Ok(self.deposits.get(&contract_id).map(|d| d.clone()))
    }
}

#[async_trait]
impl DamageReportStore for InMemoryBackend {
    async fn get_damage_report(&self, report_id: RecordId) -> Result<Option<DamageReport>> {
        Ok(self.reports.get(&report_id).map(|r| r.clone()))
    }
}

#[async_trait]
impl CompensationStore for InMemoryBackend {
    async fn compensation_for_report(
        &self,
        report_id: RecordId,
    ) -> Result<Option<CompensationTransaction>> {
        Ok(self.compensations.get(&report_id).map(|t| t.clone()))
    }

    async fn create_compensation(
        &self,
        transaction: NewCompensationTransaction,
    ) -> Result<CompensationTransaction> {
        let report_id = transaction.report_damage_id;
        match self.compensations.entry(report_id) {
            Entry::Occupied(_) => Err(LifecycleError::AlreadySettled { report_id }.into()),
            Entry::Vacant(slot) => {
                let stored = transaction.into_transaction(self.next_id());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }
}
