//! Coupons
//!
//! A local eligibility table standing in for a server-side coupon endpoint.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Reasons a coupon code is refused. The display text is shown to the shopper.
#[derive(Debug, Error, PartialEq)]
pub enum CouponError {
    /// Nothing was entered.
    #[error("Please enter a coupon code")]
    Empty,

    /// The code is not in the table.
    #[error("Invalid coupon code")]
    Unknown(String),

    /// The subtotal is below the coupon's minimum order.
    #[error("Minimum order of {minimum:.2} required for this coupon")]
    MinimumOrder {
        /// Normalised coupon code
        code: String,
        /// Required subtotal
        minimum: Decimal,
    },
}

/// Eligibility rule for one code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponRule {
    /// Share of the subtotal taken off
    pub discount: Percentage,

    /// Subtotal required before the code is accepted
    pub min_order: Decimal,

    /// Whether the code advertises free shipping
    pub free_shipping: bool,
}

/// A coupon accepted at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    /// Normalised coupon code
    pub code: String,

    /// Rule the code was accepted under
    pub rule: CouponRule,
}

/// Table of known coupon codes, keyed by upper-case code.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponTable {
    rules: FxHashMap<String, CouponRule>,
}

impl Default for CouponTable {
    fn default() -> Self {
        let mut table = Self::empty();

        table.insert(
            "WELCOME10",
            CouponRule {
                discount: Percentage::from(0.10),
                min_order: Decimal::ZERO,
                free_shipping: false,
            },
        );

        table.insert(
            "SAVE20",
            CouponRule {
                discount: Percentage::from(0.20),
                min_order: Decimal::from(50),
                free_shipping: false,
            },
        );

        table.insert(
            "FREESHIP",
            CouponRule {
                discount: Percentage::from(0.0),
                min_order: Decimal::ZERO,
                free_shipping: true,
            },
        );

        table
    }
}

impl CouponTable {
    /// Create a table with no codes.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: FxHashMap::default(),
        }
    }

    /// Add or replace a code.
    pub fn insert(&mut self, code: &str, rule: CouponRule) {
        self.rules.insert(normalise(code), rule);
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no codes.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check `code` against the table for an order of `subtotal`.
    ///
    /// Codes are trimmed and matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] when the code is empty, unknown, or its minimum
    /// order exceeds `subtotal`.
    pub fn validate(&self, code: &str, subtotal: Decimal) -> Result<AppliedCoupon, CouponError> {
        let code = normalise(code);

        if code.is_empty() {
            return Err(CouponError::Empty);
        }

        let Some(rule) = self.rules.get(&code) else {
            return Err(CouponError::Unknown(code));
        };

        if subtotal < rule.min_order {
            return Err(CouponError::MinimumOrder {
                code,
                minimum: rule.min_order,
            });
        }

        Ok(AppliedCoupon { code, rule: *rule })
    }
}

fn normalise(code: &str) -> String {
    code.trim().to_uppercase()
}
