//! Ledger domain types for account creation and transfers.

use banca_shared::types::{AccountId, CustomerId, Money};
use serde::{Deserialize, Serialize};

/// Direction of a transaction relative to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The account is the receiver.
    Income,
    /// The account is the origin.
    Payment,
}

impl Direction {
    /// Classifies a transaction from the point of view of `account`.
    ///
    /// Returns `None` when the account is on neither side.
    #[must_use]
    pub fn relative_to(
        account: AccountId,
        origin: Option<AccountId>,
        receiver: Option<AccountId>,
    ) -> Option<Self> {
        if origin == Some(account) {
            Some(Self::Payment)
        } else if receiver == Some(account) {
            Some(Self::Income)
        } else {
            None
        }
    }

    /// Returns the lowercase name used in API payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Payment => "payment",
        }
    }
}

/// A signed contribution to an account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    /// Income or payment.
    pub direction: Direction,
    /// Positive transaction amount.
    pub amount: Money,
}

impl Movement {
    /// An incoming amount.
    #[must_use]
    pub const fn income(amount: Money) -> Self {
        Self {
            direction: Direction::Income,
            amount,
        }
    }

    /// An outgoing amount.
    #[must_use]
    pub const fn payment(amount: Money) -> Self {
        Self {
            direction: Direction::Payment,
            amount,
        }
    }
}

/// A request to move money out of (or into) an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Optional free-text concept.
    pub concept: Option<String>,
    /// Amount to move.
    pub amount: Money,
    /// Debited account.
    pub origin: Option<AccountId>,
    /// Credited account.
    pub receiver: Option<AccountId>,
}

/// An income created together with its account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedIncome {
    /// Optional free-text concept.
    pub concept: Option<String>,
    /// Amount credited to the new account.
    pub amount: Money,
}

/// Input for opening an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Unique human-readable identifier.
    pub identifier: String,
    /// Owning customer.
    pub owner: CustomerId,
    /// Seed incomes; at least one is required.
    pub incomes: Vec<SeedIncome>,
}
