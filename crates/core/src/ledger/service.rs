//! Ledger service composing the field rules into operation checks.
//!
//! The service is pure: callers load balances and existence facts from
//! storage and hand them in. The repository runs [`LedgerService::validate_transfer`]
//! inside the same database transaction that inserts the row.

use banca_shared::types::Money;

use super::balance::AccountBalance;
use super::error::LedgerError;
use super::types::{NewAccount, TransferRequest};
use super::validation::{validate_amount, validate_concept, validate_identifier};

/// Stateless ledger rule checks.
pub struct LedgerService;

impl LedgerService {
    /// Checks the rules that need no stored state, in order:
    /// amount, concept, counterparty presence, distinct origin and receiver.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate_transfer_shape(request: &TransferRequest) -> Result<(), LedgerError> {
        validate_amount(request.amount)?;
        validate_concept(request.concept.as_deref())?;

        match (request.origin, request.receiver) {
            (None, None) => Err(LedgerError::MissingCounterparty),
            (Some(origin), Some(receiver)) if origin == receiver => {
                Err(LedgerError::SameOriginAndReceiver)
            }
            _ => Ok(()),
        }
    }

    /// Checks every transfer rule, including funds.
    ///
    /// `origin_balance` must be the balance of `request.origin` read under
    /// the origin lock; it is ignored when the request has no origin.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate_transfer(
        request: &TransferRequest,
        origin_balance: Option<&AccountBalance>,
    ) -> Result<(), LedgerError> {
        Self::validate_transfer_shape(request)?;

        if request.origin.is_some() {
            let available = origin_balance.map_or(Money::ZERO, |b| b.current);
            if request.amount > available {
                return Err(LedgerError::InsufficientBalance {
                    available,
                    requested: request.amount,
                });
            }
        }
        Ok(())
    }

    /// Checks an account opening request.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidIdentifier`], [`LedgerError::MissingSeedIncome`]
    /// or the first seed income violating the amount or concept rules.
    pub fn validate_new_account(account: &NewAccount) -> Result<(), LedgerError> {
        validate_identifier(&account.identifier)?;

        if account.incomes.is_empty() {
            return Err(LedgerError::MissingSeedIncome);
        }
        for income in &account.incomes {
            validate_amount(income.amount)?;
            validate_concept(income.concept.as_deref())?;
        }
        Ok(())
    }
}
