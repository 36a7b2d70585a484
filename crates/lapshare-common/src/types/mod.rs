//! Core data types for Lapshare

pub mod compensation;
pub mod contract;
pub mod damage_report;
pub mod deposit;
pub mod money;
