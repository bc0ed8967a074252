//! Cart Ledger
//!
//! A storefront shopping cart: a persisted ledger of line items with
//! item-level and flash discounts, plus the checkout totals derived from it.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod discounts;
pub mod flash;
pub mod items;
pub mod prelude;
pub mod pricing;
pub mod storage;
pub mod tiers;
