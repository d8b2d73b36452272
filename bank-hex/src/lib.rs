//! # Bank Hex
//!
//! Application service layer and HTTP adapter for the bank service.
//!
//! ## Architecture
//!
//! - `service/` - Balance mutation service (orchestrates one unit of work)
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The service is generic over `S: LedgerStore`, allowing
//! different store implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::BalanceService;
