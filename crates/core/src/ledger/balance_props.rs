//! Property-based tests for balance aggregation.

use banca_shared::types::{AccountId, Money};
use proptest::prelude::*;

use super::balance::AccountBalance;
use super::types::{Direction, Movement};

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(Money::from_minor)
}

/// Strategy to generate a single income or payment.
fn movement() -> impl Strategy<Value = Movement> {
    (prop::bool::ANY, positive_amount()).prop_map(|(incoming, amount)| {
        if incoming {
            Movement::income(amount)
        } else {
            Movement::payment(amount)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Current balance always equals incomes minus payments.
    #[test]
    fn prop_current_is_incomes_minus_payments(
        movements in prop::collection::vec(movement(), 0..50),
    ) {
        let balance = AccountBalance::from_movements(AccountId::new(1), &movements);

        prop_assert_eq!(balance.current, balance.incomes - balance.payments);
    }

    /// Folding movements equals aggregating each direction separately.
    #[test]
    fn prop_fold_matches_totals(
        movements in prop::collection::vec(movement(), 0..50),
    ) {
        let incomes: Money = movements
            .iter()
            .filter(|m| m.direction == Direction::Income)
            .map(|m| m.amount)
            .sum();
        let payments: Money = movements
            .iter()
            .filter(|m| m.direction == Direction::Payment)
            .map(|m| m.amount)
            .sum();

        let folded = AccountBalance::from_movements(AccountId::new(1), &movements);
        let aggregated = AccountBalance::from_totals(AccountId::new(1), incomes, payments);

        prop_assert_eq!(folded, aggregated);
    }

    /// Movement order does not change the balance.
    #[test]
    fn prop_order_independent(
        mut movements in prop::collection::vec(movement(), 0..30),
    ) {
        let forward = AccountBalance::from_movements(AccountId::new(1), &movements);
        movements.reverse();
        let backward = AccountBalance::from_movements(AccountId::new(1), &movements);

        prop_assert_eq!(forward, backward);
    }
}
