//! Field-level rules shared by transfers, seed incomes and customers.

use banca_shared::types::Money;

use super::error::LedgerError;

/// Maximum characters in an account identifier.
pub const MAX_IDENTIFIER_LEN: usize = 50;
/// Maximum characters in a transaction concept.
pub const MAX_CONCEPT_LEN: usize = 255;
/// Maximum characters in a customer name.
pub const MAX_CUSTOMER_NAME_LEN: usize = 100;
/// Largest single amount, in minor units (1,000,000,000.00).
///
/// Keeps per-account `SUM(amount_minor)` far inside `BIGINT`.
pub const MAX_AMOUNT_MINOR: i64 = 100_000_000_000;

/// Validates a transaction amount: strictly positive, at most
/// [`MAX_AMOUNT_MINOR`], at most two decimals.
///
/// # Errors
///
/// Returns [`LedgerError::NonPositiveAmount`], [`LedgerError::AmountTooLarge`]
/// or [`LedgerError::AmountPrecision`].
pub fn validate_amount(amount: Money) -> Result<(), LedgerError> {
    if !amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount);
    }
    if amount > Money::from_minor(MAX_AMOUNT_MINOR) {
        return Err(LedgerError::AmountTooLarge);
    }
    if !amount.has_cent_precision() {
        return Err(LedgerError::AmountPrecision);
    }
    Ok(())
}

/// Validates an optional concept.
pub fn validate_concept(concept: Option<&str>) -> Result<(), LedgerError> {
    match concept {
        Some(text) if text.chars().count() > MAX_CONCEPT_LEN => Err(LedgerError::ConceptTooLong),
        _ => Ok(()),
    }
}

/// Validates an account identifier.
pub fn validate_identifier(identifier: &str) -> Result<(), LedgerError> {
    if within_bounds(identifier, MAX_IDENTIFIER_LEN) {
        Ok(())
    } else {
        Err(LedgerError::InvalidIdentifier)
    }
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> Result<(), LedgerError> {
    if within_bounds(name, MAX_CUSTOMER_NAME_LEN) {
        Ok(())
    } else {
        Err(LedgerError::InvalidCustomerName)
    }
}

fn within_bounds(value: &str, max: usize) -> bool {
    let len = value.trim().chars().count();
    len >= 1 && value.chars().count() <= max
}
