//! Cart
//!
//! The cart ledger: the authoritative list of line items and active flash
//! discounts. Every mutation is written through to a [`CartRepository`]; a
//! failed write is logged and the in-memory change is kept.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    discounts::discounted_price,
    flash::FlashDiscount,
    items::LineItem,
    pricing::{PricingError, cart_total, to_money, unit_count},
    storage::CartRepository,
};

/// Complete persisted cart state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Line items in insertion order
    pub items: Vec<LineItem>,

    /// Offers shown to the shopper but not yet committed to a line item
    pub flash_discounts: Vec<FlashDiscount>,
}

/// Cart
#[derive(Debug)]
pub struct Cart<R: CartRepository> {
    state: CartSnapshot,
    repository: R,
    currency: &'static Currency,
}

impl<R: CartRepository> Cart<R> {
    /// Open a cart backed by `repository`, restoring any persisted state.
    ///
    /// Unreadable state is logged and replaced by an empty cart.
    pub fn open(repository: R, currency: &'static Currency) -> Self {
        let state = match repository.load() {
            Ok(mut state) => {
                for item in &mut state.items {
                    item.normalise();
                }

                state
            }
            Err(error) => {
                warn!(%error, "failed to load persisted cart; starting empty");

                CartSnapshot::default()
            }
        };

        debug!(
            lines = state.items.len(),
            flash_discounts = state.flash_discounts.len(),
            "opened cart"
        );

        Self {
            state,
            repository,
            currency,
        }
    }

    /// Add a line item, merging with an existing line of the same id and size.
    ///
    /// When a line already exists only its quantity changes; the prices and
    /// discount carried by `item` are ignored.
    pub fn add(&mut self, item: LineItem) {
        let existing = self
            .state
            .items
            .iter_mut()
            .find(|line| line.key() == item.key());

        if let Some(line) = existing {
            if line.unit_price() != item.unit_price() {
                debug!(
                    id = %line.id,
                    size = %line.size,
                    kept = %line.unit_price(),
                    ignored = %item.unit_price(),
                    "re-added item with a different price; keeping stored price"
                );
            }

            line.quantity = line.quantity.saturating_add(item.quantity.max(1));
        } else {
            let mut item = item;
            item.normalise();
            self.state.items.push(item);
        }

        self.persist();
    }

    /// Remove every line for the given product id.
    pub fn remove(&mut self, id: &str) {
        let before = self.state.items.len();

        self.state.items.retain(|item| item.id != id);

        if self.state.items.len() != before {
            debug!(id, removed = before - self.state.items.len(), "removed item");
        }

        self.persist();
    }

    /// Change the quantity of every line for `id` by `delta`, never below one.
    pub fn update_quantity(&mut self, id: &str, delta: i64) {
        for item in self.lines_mut(id) {
            let quantity = i64::from(item.quantity)
                .saturating_add(delta)
                .clamp(1, i64::from(u32::MAX));

            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }

        self.persist();
    }

    /// Empty the line items and the active flash discounts.
    pub fn clear(&mut self) {
        self.state.items.clear();
        self.state.flash_discounts.clear();

        debug!("cleared cart");

        self.persist();
    }

    /// Discount every line for `id` by `percentage` of its original price.
    ///
    /// The percentage is not range-checked here; see
    /// [`checked_percentage`](crate::discounts::checked_percentage). A
    /// percentage whose price overflows is logged and the line left unchanged.
    pub fn apply_discount_to_item(&mut self, id: &str, percentage: Decimal) {
        for item in self.lines_mut(id) {
            let Some(price) = discounted_price(item.original_price, percentage) else {
                warn!(
                    id = %item.id,
                    %percentage,
                    "discounted price overflows; line left unchanged"
                );
                continue;
            };

            item.discounted_price = Some(price);
            item.applied_discount = Some(percentage);
        }

        self.persist();
    }

    /// Restore the original price on every line for `id` and forget which
    /// tier or flash offer it came from.
    pub fn remove_discount_from_item(&mut self, id: &str) {
        for item in self.lines_mut(id) {
            item.discounted_price = Some(item.original_price);
            item.applied_discount = None;
            item.discount_tier_id = None;
            item.flash_discount_id = None;
        }

        self.persist();
    }

    /// Amount due for the current lines.
    pub fn total(&self) -> Decimal {
        cart_total(&self.state.items)
    }

    /// Amount due as money in the cart currency.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows minor units.
    pub fn total_money(&self) -> Result<Money<'static, Currency>, PricingError> {
        to_money(self.total(), self.currency)
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u64 {
        unit_count(&self.state.items)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.state.items.len()
    }

    /// Whether any line exists for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.state.items.iter().any(|item| item.id == id)
    }

    /// First line for `id`.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.state.items.iter().find(|item| item.id == id)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Current state.
    pub fn snapshot(&self) -> &CartSnapshot {
        &self.state
    }

    /// Backing repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Offers currently presented to the shopper.
    pub fn active_flash_discounts(&self) -> &[FlashDiscount] {
        &self.state.flash_discounts
    }

    /// Replace the set of presented offers.
    pub fn set_active_flash_discounts(&mut self, discounts: Vec<FlashDiscount>) {
        self.state.flash_discounts = discounts;

        self.persist();
    }

    /// Drop offers that are switched off or have ended by `now`.
    pub fn prune_expired_flash_discounts(&mut self, now: Timestamp) {
        let before = self.state.flash_discounts.len();

        self.state
            .flash_discounts
            .retain(|discount| discount.is_active && now < discount.end_date);

        if self.state.flash_discounts.len() != before {
            self.persist();
        }
    }

    /// Apply an active offer to the lines for `item_id` and retire the offer.
    ///
    /// Returns `false` when either the offer or the item is missing, in which
    /// case nothing changes.
    pub fn commit_flash_discount(&mut self, item_id: &str, flash_id: u64) -> bool {
        let Some(position) = self
            .state
            .flash_discounts
            .iter()
            .position(|discount| discount.id == flash_id)
        else {
            return false;
        };

        if !self.contains(item_id) {
            return false;
        }

        let discount = self.state.flash_discounts.remove(position);

        debug!(
            item_id,
            flash_id,
            percentage = %discount.percentage,
            "committing flash discount"
        );

        self.apply_discount_to_item(item_id, discount.percentage);

        for item in self.lines_mut(item_id) {
            if item.applied_discount == Some(discount.percentage) {
                item.flash_discount_id = Some(flash_id);
            }
        }

        self.persist();

        true
    }

    fn lines_mut<'a>(&'a mut self, id: &'a str) -> impl Iterator<Item = &'a mut LineItem> + 'a {
        self.state.items.iter_mut().filter(move |item| item.id == id)
    }

    fn persist(&mut self) {
        if let Err(error) = self.repository.save(&self.state) {
            warn!(%error, "failed to persist cart; keeping in-memory state");
        }
    }
}
