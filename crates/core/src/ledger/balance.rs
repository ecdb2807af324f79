//! Account balance calculations.
//!
//! Balances are never stored. They are derived from two sums over the
//! transaction table: incomes (account is receiver) and payments (account is
//! origin).

use banca_shared::types::{AccountId, Money};
use serde::{Deserialize, Serialize};

use super::types::{Direction, Movement};

/// Derived balance of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Sum of incoming amounts.
    pub incomes: Money,
    /// Sum of outgoing amounts.
    pub payments: Money,
    /// `incomes - payments`.
    pub current: Money,
}

impl AccountBalance {
    /// Creates a balance with no movements.
    #[must_use]
    pub fn new(account_id: AccountId) -> Self {
        Self::from_totals(account_id, Money::ZERO, Money::ZERO)
    }

    /// Builds a balance from already aggregated totals.
    #[must_use]
    pub fn from_totals(account_id: AccountId, incomes: Money, payments: Money) -> Self {
        Self {
            account_id,
            incomes,
            payments,
            current: incomes - payments,
        }
    }

    /// Folds individual movements into a balance.
    #[must_use]
    pub fn from_movements<'a, I>(account_id: AccountId, movements: I) -> Self
    where
        I: IntoIterator<Item = &'a Movement>,
    {
        let mut balance = Self::new(account_id);
        for movement in movements {
            balance.apply(movement);
        }
        balance
    }

    /// Applies one movement.
    pub fn apply(&mut self, movement: &Movement) {
        match movement.direction {
            Direction::Income => self.incomes = self.incomes + movement.amount,
            Direction::Payment => self.payments = self.payments + movement.amount,
        }
        self.current = self.incomes - self.payments;
    }

    /// Returns true if the current balance covers `amount`.
    #[must_use]
    pub fn can_cover(&self, amount: Money) -> bool {
        amount <= self.current
    }
}
