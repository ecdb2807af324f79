//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::customers::Entity as Customers;
pub use super::transactions::Entity as Transactions;
