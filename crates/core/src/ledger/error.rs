//! Ledger error types for rule violations.
//!
//! Every variant is a client-facing validation failure scoped to one input
//! field. Persistence failures live in the repository error types.

use banca_shared::AppError;
use banca_shared::types::Money;
use thiserror::Error;

use super::validation::{
    MAX_AMOUNT_MINOR, MAX_CONCEPT_LEN, MAX_CUSTOMER_NAME_LEN, MAX_IDENTIFIER_LEN,
};

/// Errors that can occur while validating ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Amount Errors ==========
    /// Amount is zero or negative.
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    /// Amount is above the per-transaction ceiling.
    #[error("Amount cannot exceed {}", Money::from_minor(MAX_AMOUNT_MINOR))]
    AmountTooLarge,

    /// Amount has more than two decimal places.
    #[error("Amount cannot have more than 2 decimal places")]
    AmountPrecision,

    // ========== Transfer Errors ==========
    /// Neither origin nor receiver was given.
    #[error("A transaction needs an origin or a receiver account")]
    MissingCounterparty,

    /// Origin and receiver are the same account.
    #[error("Origin and receiver must be different accounts")]
    SameOriginAndReceiver,

    /// Origin cannot cover the requested amount.
    #[error("Origin balance is less than the amount requested")]
    InsufficientBalance {
        /// Current balance of the origin.
        available: Money,
        /// Amount the transfer asked for.
        requested: Money,
    },

    // ========== Account Errors ==========
    /// Account creation without a seed income.
    #[error("You must specify an initial amount")]
    MissingSeedIncome,

    /// Identifier is blank or too long.
    #[error("Identifier must be between 1 and {MAX_IDENTIFIER_LEN} characters")]
    InvalidIdentifier,

    /// Concept is too long.
    #[error("Concept cannot exceed {MAX_CONCEPT_LEN} characters")]
    ConceptTooLong,

    // ========== Customer Errors ==========
    /// Customer name is blank or too long.
    #[error("Name must be between 1 and {MAX_CUSTOMER_NAME_LEN} characters")]
    InvalidCustomerName,
}

impl LedgerError {
    /// Returns the error code for logs and API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::AmountTooLarge => "AMOUNT_TOO_LARGE",
            Self::AmountPrecision => "AMOUNT_PRECISION",
            Self::MissingCounterparty => "MISSING_COUNTERPARTY",
            Self::SameOriginAndReceiver => "SAME_ORIGIN_AND_RECEIVER",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::MissingSeedIncome => "MISSING_SEED_INCOME",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::ConceptTooLong => "CONCEPT_TOO_LONG",
            Self::InvalidCustomerName => "INVALID_CUSTOMER_NAME",
        }
    }

    /// Returns the input field the violation is attached to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount
            | Self::AmountTooLarge
            | Self::AmountPrecision
            | Self::InsufficientBalance { .. } => "amount",
            Self::MissingCounterparty | Self::SameOriginAndReceiver => "origin",
            Self::MissingSeedIncome => "incomes",
            Self::InvalidIdentifier => "identifier",
            Self::ConceptTooLong => "concept",
            Self::InvalidCustomerName => "name",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::field(err.field(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(LedgerError::NonPositiveAmount, "amount", "NON_POSITIVE_AMOUNT")]
    #[case(LedgerError::AmountTooLarge, "amount", "AMOUNT_TOO_LARGE")]
    #[case(LedgerError::AmountPrecision, "amount", "AMOUNT_PRECISION")]
    #[case(LedgerError::MissingCounterparty, "origin", "MISSING_COUNTERPARTY")]
    #[case(LedgerError::SameOriginAndReceiver, "origin", "SAME_ORIGIN_AND_RECEIVER")]
    #[case(LedgerError::MissingSeedIncome, "incomes", "MISSING_SEED_INCOME")]
    #[case(LedgerError::InvalidIdentifier, "identifier", "INVALID_IDENTIFIER")]
    #[case(LedgerError::ConceptTooLong, "concept", "CONCEPT_TOO_LONG")]
    #[case(LedgerError::InvalidCustomerName, "name", "INVALID_CUSTOMER_NAME")]
    fn test_field_and_code(
        #[case] err: LedgerError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        assert_eq!(err.field(), field);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = LedgerError::InsufficientBalance {
            available: Money::new(dec!(100)),
            requested: Money::new(dec!(150)),
        };
        assert_eq!(err.field(), "amount");
        assert_eq!(
            err.to_string(),
            "Origin balance is less than the amount requested"
        );
    }

    #[test]
    fn test_length_messages_include_limits() {
        assert_eq!(
            LedgerError::InvalidIdentifier.to_string(),
            "Identifier must be between 1 and 50 characters"
        );
        assert_eq!(
            LedgerError::ConceptTooLong.to_string(),
            "Concept cannot exceed 255 characters"
        );
        assert_eq!(
            LedgerError::AmountTooLarge.to_string(),
            "Amount cannot exceed 1000000000.00"
        );
    }

    #[test]
    fn test_converts_to_field_scoped_app_error() {
        let app: AppError = LedgerError::SameOriginAndReceiver.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.field_name(), Some("origin"));
        assert_eq!(
            app.to_string(),
            "Validation error: Origin and receiver must be different accounts"
        );
    }
}
