//! Property-based tests for transfer validation.

use banca_shared::types::{AccountId, Money};
use proptest::prelude::*;

use super::balance::AccountBalance;
use super::error::LedgerError;
use super::service::LedgerService;
use super::types::TransferRequest;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(Money::from_minor)
}

/// Strategy to generate zero or negative amounts.
fn non_positive_amount() -> impl Strategy<Value = Money> {
    (0i64..100_000_000i64).prop_map(|cents| Money::from_minor(-cents))
}

fn account_id() -> impl Strategy<Value = AccountId> {
    (1i64..10_000i64).prop_map(AccountId::new)
}

fn request(amount: Money, origin: AccountId, receiver: Option<AccountId>) -> TransferRequest {
    TransferRequest {
        concept: None,
        amount,
        origin: Some(origin),
        receiver,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A transfer with amount <= 0 is always rejected.
    #[test]
    fn prop_non_positive_amount_rejected(
        amount in non_positive_amount(),
        origin in account_id(),
        receiver in proptest::option::of(account_id()),
        balance in positive_amount(),
    ) {
        let available = AccountBalance::from_totals(origin, balance, Money::ZERO);
        let result = LedgerService::validate_transfer(&request(amount, origin, receiver), Some(&available));

        prop_assert_eq!(result, Err(LedgerError::NonPositiveAmount));
    }

    /// Origin == receiver is always rejected regardless of amount.
    #[test]
    fn prop_same_account_rejected(
        amount in positive_amount(),
        account in account_id(),
        balance in positive_amount(),
    ) {
        let available = AccountBalance::from_totals(account, balance, Money::ZERO);
        let result = LedgerService::validate_transfer(&request(amount, account, Some(account)), Some(&available));

        prop_assert_eq!(result, Err(LedgerError::SameOriginAndReceiver));
    }

    /// Amount above the origin balance is always rejected.
    #[test]
    fn prop_overdraft_rejected(
        balance_cents in 0i64..10_000_000i64,
        excess_cents in 1i64..10_000_000i64,
        origin in account_id(),
    ) {
        let receiver = AccountId::new(origin.into_inner() + 10_000);
        let available = AccountBalance::from_totals(origin, Money::from_minor(balance_cents), Money::ZERO);
        let amount = Money::from_minor(balance_cents + excess_cents);

        let result = LedgerService::validate_transfer(&request(amount, origin, Some(receiver)), Some(&available));

        let is_insufficient = matches!(result, Err(LedgerError::InsufficientBalance { .. }));
        prop_assert!(is_insufficient, "expected insufficient balance, got {:?}", result);
    }

    /// Any amount up to the balance between distinct accounts is accepted.
    #[test]
    fn prop_covered_transfer_accepted(
        amount_cents in 1i64..10_000_000i64,
        headroom_cents in 0i64..10_000_000i64,
        origin in account_id(),
    ) {
        let receiver = AccountId::new(origin.into_inner() + 10_000);
        let available = AccountBalance::from_totals(
            origin,
            Money::from_minor(amount_cents + headroom_cents),
            Money::ZERO,
        );
        let amount = Money::from_minor(amount_cents);

        prop_assert!(LedgerService::validate_transfer(&request(amount, origin, Some(receiver)), Some(&available)).is_ok());
    }
}
