//! Settlement Service
//!
//! Fetches the inputs of a settlement from the backend, computes the default
//! split, and records the operator's final figures as a compensation
//! transaction. Figures are validated right before they are persisted, after
//! the inputs have been fetched again, so edits made in between are checked
//! against current data.

use std::sync::Arc;

use lapshare_common::{
    BorrowHistory, CompensationStatus, CompensationTransaction, Contract, DamageReport,
    DepositTransaction, LapshareError, MarketplaceBackend, NewCompensationTransaction, RecordId,
    Result, ValidationError, Vnd,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::calculator::{
    compute_default_settlement, revise_settlement, validate_before_submit, SettlementField,
    SettlementFigures, SettlementResult,
};
use crate::config::SettlementConfig;
use crate::lifecycle::SettlementState;
use crate::metrics::SettlementMetrics;

/// Everything an operator sees before deciding a settlement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementContext {
    pub report: DamageReport,
    pub borrow_history: BorrowHistory,
    pub contract: Contract,
    pub deposit: DepositTransaction,
    /// Damage fee after the item value cap
    pub damage_fee: Vnd,
    pub held_amount: Vnd,
    pub default_settlement: SettlementResult,
    /// Transaction already recorded for the report, if any
    pub existing: Option<CompensationTransaction>,
    pub state: SettlementState,
}

/// Settlement workflow over a marketplace backend
pub struct SettlementService {
    backend: Arc<dyn MarketplaceBackend>,
    config: SettlementConfig,
    metrics: Arc<SettlementMetrics>,
}

impl SettlementService {
    pub fn new(backend: Arc<dyn MarketplaceBackend>, config: SettlementConfig) -> Result<Self> {
        let metrics = SettlementMetrics::new()
            .map_err(|e| LapshareError::Internal(format!("Failed to create metrics: {e}")))?;

        Ok(Self {
            backend,
            config,
            metrics: Arc::new(metrics),
        })
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<SettlementMetrics> {
        self.metrics.clone()
    }

    /// Default settlement for raw amounts
    pub fn preview(&self, damage_fee: Vnd, held_amount: Vnd) -> SettlementResult {
        self.metrics.settlements_computed.inc();
        compute_default_settlement(damage_fee, held_amount)
    }

    /// Apply an operator edit
    pub fn revise(
        &self,
        current: &SettlementFigures,
        edited_field: SettlementField,
        new_value: i64,
        damage_fee: Vnd,
        held_amount: Vnd,
    ) -> SettlementResult {
        revise_settlement(current, edited_field, new_value, damage_fee, held_amount)
    }

    /// Fetch the report, its contract, and deposit, and compute the default split
    #[instrument(skip(self))]
    pub async fn prepare(&self, report_id: RecordId) -> Result<SettlementContext> {
        let context = self.load(report_id).await?;
        self.metrics.settlements_computed.inc();
        Ok(context)
    }

    async fn load(&self, report_id: RecordId) -> Result<SettlementContext> {
        let report = self
            .backend
            .get_damage_report(report_id)
            .await?
            .ok_or_else(|| LapshareError::not_found("Damage report", report_id))?;

        let history_id = report.borrow_history_id;
        let borrow_history = self
            .backend
            .get_borrow_history(history_id)
            .await?
            .ok_or_else(|| LapshareError::not_found("Borrow history", history_id))?;

        let contract_id = borrow_history.contract_id;
        let (contract, deposit, existing) = tokio::try_join!(
            self.backend.get_contract(contract_id),
            self.backend.deposit_for_contract(contract_id),
            self.backend.compensation_for_report(report_id),
        )?;
        let contract = contract.ok_or_else(|| LapshareError::not_found("Contract", contract_id))?;
        let deposit =
            deposit.ok_or_else(|| LapshareError::not_found("Deposit for contract", contract_id))?;

        let damage_fee = report
            .assess(&contract)
            .settled_fee(&self.config.damage_fee);
        if damage_fee != report.damage_fee {
            debug!(
                report_id,
                assessed = %report.damage_fee,
                capped = %damage_fee,
                "Damage fee capped at item value"
            );
        }

        let held_amount = deposit.amount;
        let default_settlement = compute_default_settlement(damage_fee, held_amount);
        let state = SettlementState::from_records(Some(&report), existing.as_ref());

        info!(
            report_id,
            contract_id,
            %damage_fee,
            %held_amount,
            used_deposit = %default_settlement.used_deposit_amount(),
            extra_payment = %default_settlement.extra_payment_required(),
            settled = state.is_settled(),
            "Loaded settlement inputs"
        );

        Ok(SettlementContext {
            report,
            borrow_history,
            contract,
            deposit,
            damage_fee,
            held_amount,
            default_settlement,
            existing,
            state,
        })
    }

    /// Current lifecycle state of a damage report
    #[instrument(skip(self))]
    pub async fn state(&self, report_id: RecordId) -> Result<SettlementState> {
        let report = self.backend.get_damage_report(report_id).await?;
        let existing = match report {
            Some(_) => self.backend.compensation_for_report(report_id).await?,
            None => None,
        };
        Ok(SettlementState::from_records(report.as_ref(), existing.as_ref()))
    }

    /// Record the operator's figures as the report's compensation transaction
    ///
    /// Nothing is kept locally when this fails; the caller may resubmit.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        report_id: RecordId,
        figures: SettlementFigures,
    ) -> Result<CompensationTransaction> {
        let context = self.load(report_id).await?;
        self.submit_with(context, figures).await
    }

    /// Record the default split unchanged
    ///
    /// Zero-damage reports go through here to leave an explicit record of the
    /// full deposit return.
    #[instrument(skip(self))]
    pub async fn settle_default(&self, report_id: RecordId) -> Result<CompensationTransaction> {
        let context = self.load(report_id).await?;
        self.metrics.settlements_computed.inc();
        let figures = *context.default_settlement.figures();
        self.submit_with(context, figures).await
    }

    async fn submit_with(
        &self,
        context: SettlementContext,
        figures: SettlementFigures,
    ) -> Result<CompensationTransaction> {
        let report_id = context.report.report_id;
        context.state.ensure_settleable()?;

        if let Err(err) = validate_before_submit(&figures, context.damage_fee, context.held_amount)
        {
            self.metrics
                .validation_failures
                .with_label_values(&[validation_reason(&err)])
                .inc();
            warn!(report_id, error = %err, "Settlement rejected before submission");
            return Err(err.into());
        }

        let new_tx = NewCompensationTransaction {
            contract_id: context.contract.id,
            user_id: context.borrow_history.user_id,
            report_damage_id: report_id,
            deposit_transaction_id: context.deposit.id,
            compensation_amount: figures.compensation_amount,
            used_deposit_amount: figures.used_deposit_amount,
            extra_payment_required: figures.extra_payment_required,
            status: CompensationStatus::Done,
        };

        let transaction = match self.backend.create_compensation(new_tx).await {
            Ok(tx) => tx,
            Err(err) => {
                let retryable = if err.is_retryable() { "true" } else { "false" };
                self.metrics
                    .submission_failures
                    .with_label_values(&[retryable])
                    .inc();
                warn!(report_id, error = %err, retryable, "Compensation transaction not recorded");
                return Err(err);
            }
        };

        self.metrics.settlements_persisted.inc();
        // Already stored, so a mismatch is only reported
        if let Err(err) = context.state.settle(&transaction) {
            warn!(
                report_id,
                transaction_id = transaction.id,
                error = %err,
                "Backend linked the compensation transaction to another report"
            );
        }

        info!(
            report_id,
            transaction_id = transaction.id,
            compensation = %transaction.compensation_amount,
            used_deposit = %transaction.used_deposit_amount,
            extra_payment = %transaction.extra_payment_required,
            refund = %transaction.refund_to_borrower(context.held_amount),
            "Settlement recorded"
        );

        Ok(transaction)
    }
}

fn validation_reason(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::InvariantViolation { .. } => "invariant",
        ValidationError::ExceedsDeposit { .. } => "exceeds_deposit",
        ValidationError::ExceedsDamageFee { .. } => "exceeds_damage_fee",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory_store::InMemoryBackend;
    use chrono::Utc;
    use lapshare_common::{DamageFeePolicy, LifecycleError};

    const REPORT_ID: RecordId = 21;

    fn seeded_backend(damage_fee: u64, deposit: u64) -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());
        backend.insert_contract(Contract {
            id: 7,
            user_id: 3,
            item_id: 11,
            item_value: Vnd::new(2_000_000),
            expected_return_date: Utc::now(),
            terms: String::new(),
        });
        backend.insert_borrow_history(BorrowHistory {
            id: 5,
            contract_id: 7,
            user_id: 3,
            item_id: 11,
            borrow_date: Utc::now(),
            return_date: Some(Utc::now()),
        });
        backend.record_deposit(7, Vnd::new(deposit)).unwrap();
        backend.insert_damage_report(DamageReport {
            report_id: REPORT_ID,
            item_id: 11,
            borrow_history_id: 5,
            damage_fee: Vnd::new(damage_fee),
            condition_before_borrow: "Like new".into(),
            condition_after_return: "Scratched lid".into(),
            note: String::new(),
        });
        backend
    }

    fn service(backend: Arc<InMemoryBackend>) -> SettlementService {
        SettlementService::new(backend, SettlementConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_prepare_computes_default() {
        let service = service(seeded_backend(800_000, 500_000));
        let context = service.prepare(REPORT_ID).await.unwrap();

        assert_eq!(context.contract.id, 7);
        assert_eq!(context.held_amount, Vnd::new(500_000));
        assert_eq!(
            context.default_settlement.extra_payment_required(),
            Vnd::new(300_000)
        );
        assert_eq!(context.state, SettlementState::Reported { report_id: REPORT_ID });
        assert!(context.existing.is_none());
        assert_eq!(service.metrics().settlements_computed.get(), 1);
    }

    #[tokio::test]
    async fn test_prepare_caps_damage_fee() {
        let service = service(seeded_backend(3_000_000, 500_000));
        let context = service.prepare(REPORT_ID).await.unwrap();

        assert_eq!(context.damage_fee, Vnd::new(2_000_000));
        assert_eq!(
            context.default_settlement.compensation_amount(),
            Vnd::new(2_000_000)
        );
    }

    #[tokio::test]
    async fn test_prepare_uncapped_damage_fee() {
        let config = SettlementConfig {
            damage_fee: DamageFeePolicy {
                cap_at_item_value: false,
            },
            ..SettlementConfig::default()
        };
        let service =
            SettlementService::new(seeded_backend(3_000_000, 500_000), config).unwrap();
        let context = service.prepare(REPORT_ID).await.unwrap();

        assert_eq!(context.damage_fee, Vnd::new(3_000_000));
    }

    #[tokio::test]
    async fn test_prepare_missing_report() {
        let service = service(seeded_backend(0, 500_000));
        let err = service.prepare(404).await.unwrap_err();
        assert!(matches!(
            err,
            LapshareError::NotFound {
                kind: "Damage report",
                id: 404
            }
        ));
    }

    #[tokio::test]
    async fn test_submit_revised_figures() {
        let service = service(seeded_backend(800_000, 500_000));
        let context = service.prepare(REPORT_ID).await.unwrap();
        let revised = service.revise(
            context.default_settlement.figures(),
            SettlementField::UsedDepositAmount,
            400_000,
            context.damage_fee,
            context.held_amount,
        );

        let tx = service.submit(REPORT_ID, *revised.figures()).await.unwrap();

        assert_eq!(tx.report_damage_id, REPORT_ID);
        assert_eq!(tx.contract_id, 7);
        assert_eq!(tx.user_id, 3);
        assert_eq!(tx.used_deposit_amount, Vnd::new(400_000));
        assert_eq!(tx.extra_payment_required, Vnd::new(400_000));
        assert_eq!(tx.status, CompensationStatus::Done);
        assert_eq!(tx.refund_to_borrower(Vnd::new(500_000)), Vnd::new(100_000));
        assert_eq!(service.metrics().settlements_persisted.get(), 1);
    }

    #[tokio::test]
    async fn test_submit_blocks_invalid_figures() {
        let backend = seeded_backend(800_000, 500_000);
        let service = service(backend.clone());

        let err = service
            .submit(
                REPORT_ID,
                SettlementFigures {
                    compensation_amount: Vnd::new(800_000),
                    used_deposit_amount: Vnd::new(600_000),
                    extra_payment_required: Vnd::new(200_000),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LapshareError::Validation(ValidationError::ExceedsDeposit { .. })
        ));
        assert_eq!(
            service
                .metrics()
                .validation_failures
                .with_label_values(&["exceeds_deposit"])
                .get(),
            1
        );
        assert_eq!(
            service.state(REPORT_ID).await.unwrap(),
            SettlementState::Reported { report_id: REPORT_ID }
        );
    }

    #[tokio::test]
    async fn test_zero_damage_settled_explicitly() {
        let service = service(seeded_backend(0, 500_000));

        assert_eq!(
            service.state(REPORT_ID).await.unwrap(),
            SettlementState::Reported { report_id: REPORT_ID }
        );

        let tx = service.settle_default(REPORT_ID).await.unwrap();
        assert_eq!(tx.compensation_amount, Vnd::ZERO);
        assert_eq!(tx.refund_to_borrower(Vnd::new(500_000)), Vnd::new(500_000));

        assert!(service.state(REPORT_ID).await.unwrap().is_settled());
    }

    #[tokio::test]
    async fn test_settle_default_computes_once() {
        let service = service(seeded_backend(0, 500_000));
        service.settle_default(REPORT_ID).await.unwrap();

        assert_eq!(service.metrics().settlements_computed.get(), 1);
        assert_eq!(service.metrics().settlements_persisted.get(), 1);
    }

    #[tokio::test]
    async fn test_submit_does_not_count_as_computed() {
        let service = service(seeded_backend(300_000, 500_000));
        let figures = SettlementFigures {
            compensation_amount: Vnd::new(300_000),
            used_deposit_amount: Vnd::new(300_000),
            extra_payment_required: Vnd::ZERO,
        };
        service.submit(REPORT_ID, figures).await.unwrap();

        assert_eq!(service.metrics().settlements_computed.get(), 0);
        assert_eq!(service.metrics().settlements_persisted.get(), 1);
    }

    #[tokio::test]
    async fn test_cannot_settle_twice() {
        let service = service(seeded_backend(300_000, 500_000));
        service.settle_default(REPORT_ID).await.unwrap();

        let err = service.settle_default(REPORT_ID).await.unwrap_err();
        assert!(matches!(
            err,
            LapshareError::Lifecycle(LifecycleError::AlreadySettled { report_id: REPORT_ID })
        ));
    }

    #[tokio::test]
    async fn test_state_without_report() {
        let service = service(seeded_backend(0, 500_000));
        assert_eq!(
            service.state(999).await.unwrap(),
            SettlementState::NoReport
        );
    }
}
