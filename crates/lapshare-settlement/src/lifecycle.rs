//! Settlement lifecycle of a damage report
//!
//! ```text
//! NoReport --report--> Reported --settle--> Settled
//! ```
//!
//! `settle` is a staff action and happens once. There is no way back from
//! `Settled`. A report with a zero damage fee is still settled explicitly so
//! the deposit return leaves an audit record.

use lapshare_common::{CompensationTransaction, DamageReport, LifecycleError, RecordId};
use serde::{Deserialize, Serialize};

/// Where a damage report stands in the settlement workflow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SettlementState {
    #[default]
    NoReport,
    Reported {
        report_id: RecordId,
    },
    Settled {
        report_id: RecordId,
        transaction_id: RecordId,
    },
}

impl SettlementState {
    /// Derive the state from the backend records
    pub fn from_records(
        report: Option<&DamageReport>,
        transaction: Option<&CompensationTransaction>,
    ) -> Self {
        match (report, transaction) {
            (None, _) => SettlementState::NoReport,
            (Some(report), None) => SettlementState::Reported {
                report_id: report.report_id,
            },
            (Some(report), Some(tx)) => SettlementState::Settled {
                report_id: report.report_id,
                transaction_id: tx.id,
            },
        }
    }

    /// A damage assessment was recorded
    pub fn report(self, report_id: RecordId) -> Result<Self, LifecycleError> {
        match self {
            SettlementState::NoReport => Ok(SettlementState::Reported { report_id }),
            SettlementState::Reported { report_id } => {
                Err(LifecycleError::AlreadyReported { report_id })
            }
            SettlementState::Settled { report_id, .. } => {
                Err(LifecycleError::AlreadySettled { report_id })
            }
        }
    }

    /// Staff recorded the compensation transaction
    pub fn settle(self, transaction: &CompensationTransaction) -> Result<Self, LifecycleError> {
        match self {
            SettlementState::NoReport => Err(LifecycleError::NoReport),
            SettlementState::Reported { report_id } => {
                if transaction.report_damage_id != report_id {
                    return Err(LifecycleError::ReportMismatch {
                        report_id,
                        other_id: transaction.report_damage_id,
                    });
                }
                Ok(SettlementState::Settled {
                    report_id,
                    transaction_id: transaction.id,
                })
            }
            SettlementState::Settled { report_id, .. } => {
                Err(LifecycleError::AlreadySettled { report_id })
            }
        }
    }

    /// Fail unless the report is waiting for a settlement
    pub fn ensure_settleable(&self) -> Result<RecordId, LifecycleError> {
        match *self {
            SettlementState::Reported { report_id } => Ok(report_id),
            SettlementState::NoReport => Err(LifecycleError::NoReport),
            SettlementState::Settled { report_id, .. } => {
                Err(LifecycleError::AlreadySettled { report_id })
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, SettlementState::Settled { .. })
    }
}
