//! Core business logic for Banca.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All ledger rules live here; the database layer supplies balances and the
//! API layer maps [`ledger::LedgerError`] to responses.

pub mod ledger;
