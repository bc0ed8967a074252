//! Discount Tiers
//!
//! Read-only promotional rules published by the storefront API. The cart never
//! stores tiers; a product page quotes them against a base price and feeds the
//! chosen tier's effective percentage to
//! [`Cart::apply_discount_to_item`](crate::cart::Cart::apply_discount_to_item).

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::round_currency;

/// How a tier is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplyType {
    /// Requires the shopper to enter a code
    Code,

    /// Applied automatically
    Auto,
}

/// Kind of promotional rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Percentage or fixed amount off the product price
    AmountOffProducts,

    /// Bulk unit price from a minimum quantity
    BuyXGetY,

    /// Amount off the whole order
    AmountOffOrder,

    /// Shipping waived
    FreeShipping,
}

/// A server-defined discount tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Tier identifier
    pub tier_id: u64,

    /// How the tier is triggered
    #[serde(rename = "Discount_APPLY_type")]
    pub apply_type: ApplyType,

    /// Code for [`ApplyType::Code`] tiers
    #[serde(default)]
    pub discount_code: Option<String>,

    /// Kind of rule
    #[serde(rename = "type")]
    pub kind: TierKind,

    /// Smallest quantity the tier applies to
    #[serde(default)]
    pub min_quantity: Option<u32>,

    /// Largest quantity the tier applies to
    #[serde(default)]
    pub max_quantity: Option<u32>,

    /// Percentage off, 0-100
    #[serde(default)]
    pub percentage_discount: Option<Decimal>,

    /// Fixed amount off
    #[serde(default)]
    pub fixed_discount: Option<Decimal>,

    /// Bulk unit price
    #[serde(default)]
    pub price_per_unit: Option<Decimal>,

    /// Whether a free ebook is bundled
    #[serde(default)]
    pub free_ebook: bool,

    /// Whether shipping is waived
    #[serde(default)]
    pub free_shipping: bool,

    /// Short label
    #[serde(default)]
    pub label: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Whether the tier is switched on
    pub is_active: bool,

    /// Start of the tier window
    pub start_date: Timestamp,

    /// End of the tier window (exclusive)
    pub end_date: Timestamp,
}

/// A tier priced against a product's base price.
#[derive(Debug, Clone, PartialEq)]
pub struct TierQuote {
    /// Tier identifier
    pub tier_id: u64,

    /// Product base price
    pub base_price: Decimal,

    /// Price after the tier
    pub final_price: Decimal,

    /// Amount saved per unit
    pub saving: Decimal,
}

impl TierQuote {
    /// Saving as a percentage of the base price, unrounded.
    ///
    /// Passing it to [`Cart::apply_discount_to_item`](crate::cart::Cart::apply_discount_to_item)
    /// reproduces [`final_price`](Self::final_price) to the cent. Zero for a
    /// zero base price.
    pub fn effective_percentage(&self) -> Decimal {
        self.saving
            .checked_div(self.base_price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }
}

impl DiscountTier {
    /// Whether the tier is switched on and `now` falls inside its window.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.start_date <= now && now < self.end_date
    }

    /// Price this tier against `base_price`.
    ///
    /// Returns `None` for kinds that do not change a product price, or when the
    /// tier lacks the amounts its kind needs.
    pub fn quote(&self, base_price: Decimal) -> Option<TierQuote> {
        let saving = match self.kind {
            TierKind::AmountOffProducts => {
                if let Some(percentage) = self.percentage_discount {
                    round_currency(
                        base_price
                            .checked_mul(percentage)?
                            .checked_div(Decimal::ONE_HUNDRED)?,
                    )
                } else {
                    self.fixed_discount?
                }
            }
            TierKind::BuyXGetY => {
                self.min_quantity?;

                base_price.checked_sub(self.price_per_unit?)?
            }
            TierKind::AmountOffOrder | TierKind::FreeShipping => return None,
        };

        Some(TierQuote {
            tier_id: self.tier_id,
            base_price,
            final_price: base_price.checked_sub(saving)?,
            saving,
        })
    }

    /// Relative saving used to rank tiers against each other.
    fn relative_saving(&self, base_price: Decimal) -> Decimal {
        if let Some(percentage) = self.percentage_discount {
            percentage
        } else if let Some(fixed) = self.fixed_discount {
            fixed
                .checked_div(base_price)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// Returns the id of the tier with the highest positive relative saving.
pub fn best_value(tiers: &[DiscountTier], base_price: Decimal) -> Option<u64> {
    tiers
        .iter()
        .map(|tier| (tier.tier_id, tier.relative_saving(base_price)))
        .filter(|(_, saving)| saving.is_sign_positive() && !saving.is_zero())
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(tier_id, _)| tier_id)
}
