//! Domain models for the bank service.

pub mod account;
pub mod money;
pub mod role;

pub use account::{Account, AccountId};
pub use money::Money;
pub use role::Role;
