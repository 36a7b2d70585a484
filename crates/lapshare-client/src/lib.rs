//! # Lapshare Client
//!
//! REST client for the marketplace backend. Implements the store traits of
//! [`lapshare_common::store`] over HTTP/JSON with bearer token auth.
//!
//! ## Endpoints
//!
//! | Store | Method | Path |
//! |-------|--------|------|
//! | Contract | GET | `/contracts/{id}` |
//! | Contract | GET | `/borrow-histories/{id}` |
//! | Deposit | GET | `/deposits?contractId={id}` |
//! | Damage report | GET | `/damage-reports/{id}` |
//! | Compensation | GET | `/compensations?reportDamageId={id}` |
//! | Compensation | POST | `/compensations` |

pub mod client;
pub mod config;
pub mod stores;

pub use client::RestBackend;
pub use config::ClientConfig;
