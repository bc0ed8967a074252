//! Discounts

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{cart::Cart, pricing::round_currency, storage::CartRepository};

/// Errors raised when validating a discount before it reaches the cart.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage outside 0-100.
    #[error("discount percentage {0} must be between 0 and 100")]
    PercentageOutOfRange(Decimal),

    /// No line for the item.
    #[error("item {0} is not in the cart")]
    ItemNotInCart(String),

    /// No active offer with this id.
    #[error("flash discount {0} is not available")]
    UnknownFlashDiscount(u64),

    /// Offer is switched off or outside its window.
    #[error("flash discount {0} has expired")]
    FlashDiscountExpired(u64),

    /// Cart total below the offer's minimum purchase.
    #[error("a minimum purchase of {minimum} is required for this offer")]
    MinimumPurchase {
        /// Required cart total
        minimum: Decimal,
    },
}

/// Calculates `original * (1 - percentage / 100)`, rounded to cents.
///
/// Returns `None` when the result does not fit in a [`Decimal`].
pub fn discounted_price(original: Decimal, percentage: Decimal) -> Option<Decimal> {
    let factor = Decimal::ONE.checked_sub(percentage.checked_div(Decimal::ONE_HUNDRED)?)?;

    original.checked_mul(factor).map(round_currency)
}

/// Validates a percentage before it is handed to the cart.
///
/// # Errors
///
/// Returns [`DiscountError::PercentageOutOfRange`] unless `0 <= value <= 100`.
pub fn checked_percentage(value: Decimal) -> Result<Decimal, DiscountError> {
    if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&value) {
        Ok(value)
    } else {
        Err(DiscountError::PercentageOutOfRange(value))
    }
}

/// Accepts an active flash discount on behalf of the shopper.
///
/// The offer must be live at `now`, the item must be in the cart and the cart
/// total must meet the offer's minimum purchase. On success the offer's
/// percentage is applied to the item and the offer leaves the active set.
///
/// # Errors
///
/// Returns a [`DiscountError`] describing the first failed check; the cart is
/// left untouched.
pub fn accept_flash_discount<R: CartRepository>(
    cart: &mut Cart<R>,
    item_id: &str,
    flash_id: u64,
    now: Timestamp,
) -> Result<(), DiscountError> {
    let discount = cart
        .active_flash_discounts()
        .iter()
        .find(|discount| discount.id == flash_id)
        .ok_or(DiscountError::UnknownFlashDiscount(flash_id))?;

    if !discount.is_live(now) {
        return Err(DiscountError::FlashDiscountExpired(flash_id));
    }

    checked_percentage(discount.percentage)?;

    if !discount.meets_minimum_purchase(cart.total()) {
        return Err(DiscountError::MinimumPurchase {
            minimum: discount.minimum_purchase.unwrap_or_default(),
        });
    }

    if !cart.contains(item_id) {
        return Err(DiscountError::ItemNotInCart(item_id.to_string()));
    }

    cart.commit_flash_discount(item_id, flash_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        flash::tests::flash_discount,
        items::LineItem,
        storage::{MemoryStore, StoreRepository},
    };

    use super::*;

    fn cart_with_item() -> Cart<StoreRepository<MemoryStore>> {
        let mut cart = Cart::open(StoreRepository::new(MemoryStore::new()), USD);

        cart.add(LineItem::new("A", "Air Max", "M", Decimal::new(10000, 2)));

        cart
    }

    fn during_offer() -> Result<Timestamp, jiff::Error> {
        "2026-10-18T10:10:00Z".parse()
    }

    #[test]
    fn discounted_price_rounds_to_cents() {
        assert_eq!(
            discounted_price(Decimal::new(10000, 2), Decimal::from(20))
                .map(|price| price.to_string()),
            Some("80.00".to_string())
        );
        assert_eq!(
            discounted_price(Decimal::new(1999, 2), Decimal::from(15)),
            Some(Decimal::new(1699, 2))
        );
    }

    #[test]
    fn discounted_price_zero_and_full() {
        assert_eq!(
            discounted_price(Decimal::new(4999, 2), Decimal::ZERO),
            Some(Decimal::new(4999, 2))
        );
        assert_eq!(
            discounted_price(Decimal::new(4999, 2), Decimal::ONE_HUNDRED),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn discounted_price_overflow_is_none() {
        assert_eq!(discounted_price(Decimal::from(1000), Decimal::MAX), None);
    }

    #[test]
    fn checked_percentage_bounds() {
        assert_eq!(checked_percentage(Decimal::ZERO), Ok(Decimal::ZERO));
        assert_eq!(
            checked_percentage(Decimal::ONE_HUNDRED),
            Ok(Decimal::ONE_HUNDRED)
        );
        assert_eq!(
            checked_percentage(Decimal::from(101)),
            Err(DiscountError::PercentageOutOfRange(Decimal::from(101)))
        );
        assert!(checked_percentage(Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn accept_flash_discount_applies_offer() -> TestResult {
        let mut cart = cart_with_item();
        cart.set_active_flash_discounts(vec![flash_discount(3, 20)?]);

        accept_flash_discount(&mut cart, "A", 3, during_offer()?)?;

        assert_eq!(cart.total(), Decimal::new(8000, 2));
        assert!(cart.active_flash_discounts().is_empty());

        Ok(())
    }

    #[test]
    fn accept_flash_discount_rejects_expired_offer() -> TestResult {
        let mut cart = cart_with_item();
        cart.set_active_flash_discounts(vec![flash_discount(3, 20)?]);

        let result = accept_flash_discount(&mut cart, "A", 3, "2026-10-18T11:00:00Z".parse()?);

        assert_eq!(result, Err(DiscountError::FlashDiscountExpired(3)));
        assert_eq!(cart.total(), Decimal::new(10000, 2));
        assert_eq!(cart.active_flash_discounts().len(), 1);

        Ok(())
    }

    #[test]
    fn accept_flash_discount_rejects_unmet_minimum() -> TestResult {
        let mut cart = cart_with_item();
        let mut offer = flash_discount(3, 20)?;
        offer.minimum_purchase = Some(Decimal::from(150));
        cart.set_active_flash_discounts(vec![offer]);

        let result = accept_flash_discount(&mut cart, "A", 3, during_offer()?);

        assert_eq!(
            result,
            Err(DiscountError::MinimumPurchase {
                minimum: Decimal::from(150)
            })
        );

        Ok(())
    }

    #[test]
    fn accept_flash_discount_rejects_out_of_range_percentage() -> TestResult {
        let mut cart = cart_with_item();
        cart.set_active_flash_discounts(vec![flash_discount(3, 120)?]);

        let result = accept_flash_discount(&mut cart, "A", 3, during_offer()?);

        assert_eq!(
            result,
            Err(DiscountError::PercentageOutOfRange(Decimal::from(120)))
        );

        Ok(())
    }

    #[test]
    fn accept_flash_discount_unknown_offer_or_item() -> TestResult {
        let mut cart = cart_with_item();
        cart.set_active_flash_discounts(vec![flash_discount(3, 20)?]);

        assert_eq!(
            accept_flash_discount(&mut cart, "A", 4, during_offer()?),
            Err(DiscountError::UnknownFlashDiscount(4))
        );
        assert_eq!(
            accept_flash_discount(&mut cart, "Z", 3, during_offer()?),
            Err(DiscountError::ItemNotInCart("Z".to_string()))
        );

        Ok(())
    }
}
