//! Cart Ledger prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartSnapshot},
    checkout::{
        AppliedCoupon, Checkout, CheckoutTotals, CouponError, CouponRule, CouponTable,
        CustomerDetails, OrderConfirmation, OrderDraft, OrderError, OrderRequest, OrderSubmitter,
        PaymentMethod, ShippingMethod, ShippingRates, place_order,
        summary::{SummaryError, write_summary},
    },
    config::{ConfigError, StorefrontConfig},
    discounts::{DiscountError, accept_flash_discount, checked_percentage},
    flash::FlashDiscount,
    items::{LineItem, LineItemKey},
    pricing::{PricingError, cart_total, round_currency, to_money},
    storage::{
        CartRepository, FileStore, KeyValueStore, MemoryStore, RepositoryError, StorageError,
        StorageKeys, StoreRepository,
    },
    tiers::{ApplyType, DiscountTier, TierKind, TierQuote, best_value},
};
