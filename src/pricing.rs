//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::items::LineItem;

/// Errors that can occur while converting amounts to money.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Amount could not be represented in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    MinorUnits(Decimal),
}

/// Calculates the amount due for a list of line items.
///
/// Each line contributes its discounted unit price (or original price when no
/// discount is set) times its quantity. An empty list totals zero and the sum
/// saturates at [`Decimal::MAX`].
pub fn cart_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Counts units across all lines.
pub fn unit_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Rounds an amount to whole cents.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a decimal amount into money in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::MinorUnits`] if the amount overflows `i64` minor units.
pub fn to_money(
    amount: Decimal,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = round_currency(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.to_i64())
        .ok_or(PricingError::MinorUnits(amount))?;

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn test_items() -> [LineItem; 2] {
        [
            LineItem::new("A", "Air Max", "M", Decimal::new(5000, 2)).with_quantity(2),
            LineItem::new("B", "Court Vision", "L", Decimal::new(3000, 2))
                .with_discounted_price(Decimal::new(2400, 2)),
        ]
    }

    #[test]
    fn cart_total_prefers_discounted_price() {
        assert_eq!(cart_total(&test_items()), Decimal::new(12400, 2));
    }

    #[test]
    fn cart_total_empty_is_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn cart_total_saturates_instead_of_overflowing() {
        let items = [
            LineItem::new("A", "Air Max", "M", Decimal::MAX),
            LineItem::new("B", "Court Vision", "L", Decimal::MAX),
        ];

        assert_eq!(cart_total(&items), Decimal::MAX);
    }

    #[test]
    fn unit_count_sums_quantities() {
        assert_eq!(unit_count(&test_items()), 3);
    }

    #[test]
    fn round_currency_rounds_half_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_currency(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn to_money_uses_minor_units() -> TestResult {
        assert_eq!(
            to_money(Decimal::new(12400, 2), USD)?,
            Money::from_minor(12400, USD)
        );
        assert_eq!(to_money(Decimal::new(399, 3), GBP)?, Money::from_minor(40, GBP));

        Ok(())
    }

    #[test]
    fn to_money_overflow_returns_error() {
        let result = to_money(Decimal::MAX, USD);

        assert!(matches!(result, Err(PricingError::MinorUnits(_))));
    }
}
