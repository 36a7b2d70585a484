//! Store implementations over the REST backend

use async_trait::async_trait;
use lapshare_common::{
    BorrowHistory, CompensationStore, CompensationTransaction, Contract, ContractStore,
    DamageReport, DamageReportStore, DepositStore, DepositTransaction, LapshareError,
    LifecycleError, NewCompensationTransaction, RecordId, Result,
};
use tracing::{info, instrument};

use crate::client::RestBackend;

#[async_trait]
impl ContractStore for RestBackend {
    #[instrument(skip(self))]
    async fn get_contract(&self, id: RecordId) -> Result<Option<Contract>> {
        self.get_optional(&format!("contracts/{id}")).await
    }

    #[instrument(skip(self))]
    async fn get_borrow_history(&self, id: RecordId) -> Result<Option<BorrowHistory>> {
        self.get_optional(&format!("borrow-histories/{id}")).await
    }
}

#[async_trait]
impl DepositStore for RestBackend {
    #[instrument(skip(self))]
    async fn deposit_for_contract(
        &self,
        contract_id: RecordId,
    ) -> Result<Option<DepositTransaction>> {
        self.get_first("deposits", &[("contractId", contract_id.to_string())])
            .await
    }
}

#[async_trait]
impl DamageReportStore for RestBackend {
    #[instrument(skip(self))]
    async fn get_damage_report(&self, report_id: RecordId) -> Result<Option<DamageReport>> {
        self.get_optional(&format!("damage-reports/{report_id}"))
            .await
    }
}

#[async_trait]
impl CompensationStore for RestBackend {
    #[instrument(skip(self))]
    async fn compensation_for_report(
        &self,
        report_id: RecordId,
    ) -> Result<Option<CompensationTransaction>> {
        self.get_first(
            "compensations",
            &[("reportDamageId", report_id.to_string())],
        )
        .await
    }

    #[instrument(skip(self, transaction), fields(report_id = transaction.report_damage_id))]
    async fn create_compensation(
        &self,
        transaction: NewCompensationTransaction,
    ) -> Result<CompensationTransaction> {
        let report_id = transaction.report_damage_id;
        let created: CompensationTransaction = self
            .post("compensations", &transaction)
            .await
            .map_err(|err| match err {
                LapshareError::Backend { status: 409, .. } => {
                    LifecycleError::AlreadySettled { report_id }.into()
                }
                other => other,
            })?;

        info!(report_id, transaction_id = created.id, "Compensation transaction created");
        Ok(created)
    }
}
