//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod customer;
pub mod transaction;

pub use account::{
    AccountError, AccountRepository, AccountWithTransactions, CreateAccountInput, HistoryEntry,
    balance_of,
};
pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository};
pub use transaction::{TransactionRepository, TransferError, TransferInput};
