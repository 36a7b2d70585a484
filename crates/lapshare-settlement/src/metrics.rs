//! Prometheus metrics for the settlement workflow

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Counters updated by [`crate::SettlementService`]
pub struct SettlementMetrics {
    pub settlements_computed: IntCounter,
    pub settlements_persisted: IntCounter,
    /// Labelled by `reason`: invariant, exceeds_deposit, exceeds_damage_fee
    pub validation_failures: IntCounterVec,
    /// Labelled by `retryable`: true, false
    pub submission_failures: IntCounterVec,
}

impl SettlementMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            settlements_computed: IntCounter::new(
                "lapshare_settlements_computed_total",
                "Default settlements computed for damage reports",
            )?,
            settlements_persisted: IntCounter::new(
                "lapshare_settlements_persisted_total",
                "Compensation transactions recorded",
            )?,
            validation_failures: IntCounterVec::new(
                Opts::new(
                    "lapshare_settlement_validation_failures_total",
                    "Settlements blocked before submission",
                ),
                &["reason"],
            )?,
            submission_failures: IntCounterVec::new(
                Opts::new(
                    "lapshare_settlement_submission_failures_total",
                    "Compensation transactions the backend did not record",
                ),
                &["retryable"],
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.settlements_computed.clone()))?;
        registry.register(Box::new(self.settlements_persisted.clone()))?;
        registry.register(Box::new(self.validation_failures.clone()))?;
        registry.register(Box::new(self.submission_failures.clone()))?;
        Ok(())
    }
}
