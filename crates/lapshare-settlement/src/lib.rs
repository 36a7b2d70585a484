//! # Lapshare Settlement
//!
//! Settles damage reports on borrowed laptops against the security deposit
//! held for the loan contract.
//!
//! ## Settlement Rule
//!
//! ```text
//! used   = min(damage_fee, held)
//! extra  = damage_fee - used
//! refund = held - used
//! ```
//!
//! A zero fee returns the full deposit; a fee at or above the deposit
//! consumes all of it and leaves the rest as an extra payment.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 SettlementService                   │
//! │  prepare ──► calculator ──► validate ──► submit     │
//! │                                 │                   │
//! │                          SettlementState            │
//! │                   (NoReport/Reported/Settled)       │
//! └──────────────────────────┬──────────────────────────┘
//!                            │
//!            MarketplaceBackend (REST or in-memory)
//! ```

pub mod calculator;
pub mod config;
pub mod infra;
pub mod lifecycle;
pub mod metrics;
pub mod service;

// Re-export core types
pub use calculator::{
    compute_default_settlement, revise_settlement, validate_before_submit, SettlementField,
    SettlementFigures, SettlementNote, SettlementResult,
};
pub use config::SettlementConfig;
pub use infra::InMemoryBackend;
pub use lifecycle::SettlementState;
pub use metrics::SettlementMetrics;
pub use service::{SettlementContext, SettlementService};
