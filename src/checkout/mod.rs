//! Checkout
//!
//! Totals derived from the cart ledger: shipping, flat tax, coupon discount
//! and the final amount due. Nothing here mutates the cart except
//! [`place_order`] after a successful submission.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{cart::Cart, pricing::round_currency, storage::CartRepository};

pub mod coupons;
pub mod order;
pub mod summary;

pub use coupons::{AppliedCoupon, CouponError, CouponRule, CouponTable};
pub use order::{
    Address, CustomerDetails, OrderConfirmation, OrderDraft, OrderError, OrderItem, OrderRequest,
    OrderSubmitter, PaymentMethod, place_order,
};

/// Shipping methods offered at checkout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// 5-7 business days
    #[default]
    Standard,

    /// 2-3 business days
    Express,

    /// Next business day
    Overnight,

    /// 8-10 business days, no charge
    Free,
}

impl ShippingMethod {
    /// Every method, in display order.
    pub const ALL: [ShippingMethod; 4] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::Overnight,
        ShippingMethod::Free,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "Standard Shipping",
            ShippingMethod::Express => "Express Shipping",
            ShippingMethod::Overnight => "Overnight Shipping",
            ShippingMethod::Free => "Free Shipping",
        }
    }

    /// Delivery estimate.
    pub fn estimate(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "5-7 business days",
            ShippingMethod::Express => "2-3 business days",
            ShippingMethod::Overnight => "1 business day",
            ShippingMethod::Free => "8-10 business days",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prices of the paid shipping methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRates {
    /// Standard shipping
    pub standard: Decimal,

    /// Express shipping
    pub express: Decimal,

    /// Overnight shipping
    pub overnight: Decimal,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            standard: Decimal::new(499, 2),
            express: Decimal::new(999, 2),
            overnight: Decimal::new(1999, 2),
        }
    }
}

impl ShippingRates {
    /// Cost of `method`. Free shipping is always zero; the other methods always
    /// charge their rate whatever the subtotal.
    pub fn cost(&self, method: ShippingMethod) -> Decimal {
        match method {
            ShippingMethod::Standard => self.standard,
            ShippingMethod::Express => self.express,
            ShippingMethod::Overnight => self.overnight,
            ShippingMethod::Free => Decimal::ZERO,
        }
    }
}

/// Derived checkout amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    /// Cart total
    pub subtotal: Decimal,

    /// Shipping cost of the selected method
    pub shipping: Decimal,

    /// Flat-rate tax on the subtotal
    pub tax: Decimal,

    /// Coupon discount on the subtotal
    pub discount: Decimal,

    /// Subtotal plus shipping and tax
    pub total: Decimal,

    /// Amount due after the coupon discount
    pub final_total: Decimal,
}

/// Checkout selections layered over a cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    shipping: ShippingMethod,
    coupon: Option<AppliedCoupon>,
    rates: ShippingRates,
    tax_rate: Percentage,
    coupons: CouponTable,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new(
            ShippingRates::default(),
            Percentage::from(0.08),
            CouponTable::default(),
        )
    }
}

impl Checkout {
    /// Create a checkout with standard shipping and no coupon.
    pub fn new(rates: ShippingRates, tax_rate: Percentage, coupons: CouponTable) -> Self {
        Self {
            shipping: ShippingMethod::default(),
            coupon: None,
            rates,
            tax_rate,
            coupons,
        }
    }

    /// Selected shipping method.
    pub fn shipping(&self) -> ShippingMethod {
        self.shipping
    }

    /// Select a shipping method.
    pub fn select_shipping(&mut self, method: ShippingMethod) {
        self.shipping = method;
    }

    /// Coupon currently applied, if any.
    pub fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Shipping rates in use.
    pub fn rates(&self) -> &ShippingRates {
        &self.rates
    }

    /// Validate `code` against the cart total and apply it.
    ///
    /// A refused code leaves any previously applied coupon in place.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] when the code is refused.
    pub fn apply_coupon<R: CartRepository>(
        &mut self,
        code: &str,
        cart: &Cart<R>,
    ) -> Result<&AppliedCoupon, CouponError> {
        let coupon = self.coupons.validate(code, cart.total())?;

        debug!(code = %coupon.code, "applied coupon");

        Ok(&*self.coupon.insert(coupon))
    }

    /// Drop the applied coupon.
    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    /// Derive the checkout totals for `cart`.
    pub fn totals<R: CartRepository>(&self, cart: &Cart<R>) -> CheckoutTotals {
        self.totals_for(cart.total())
    }

    /// Derive the checkout totals for a given subtotal.
    pub fn totals_for(&self, subtotal: Decimal) -> CheckoutTotals {
        let shipping = self.rates.cost(self.shipping);
        let tax = round_currency(self.tax_rate * subtotal);

        let discount = self
            .coupon
            .as_ref()
            .map_or(Decimal::ZERO, |coupon| {
                round_currency(coupon.rule.discount * subtotal)
            });

        let total = subtotal.saturating_add(shipping).saturating_add(tax);

        CheckoutTotals {
            subtotal,
            shipping,
            tax,
            discount,
            total,
            final_total: total.saturating_sub(discount),
        }
    }
}
