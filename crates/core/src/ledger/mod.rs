//! Ledger rules for accounts and transfers.
//!
//! This module implements the pure side of the ledger:
//! - Balance aggregation from incomes and payments
//! - Field rules for amounts, concepts, identifiers and names
//! - Transfer and account-opening checks
//! - Error types for rule violations

pub mod balance;
pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod service_props;

pub use balance::AccountBalance;
pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{Direction, Movement, NewAccount, SeedIncome, TransferRequest};
