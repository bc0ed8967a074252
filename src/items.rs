//! Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of a line in the cart: product id plus selected size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey<'a> {
    /// Product identifier
    pub id: &'a str,

    /// Selected size label
    pub size: &'a str,
}

/// One distinct purchasable configuration in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Selected size label, empty for products without sizes
    #[serde(default)]
    pub size: String,

    /// Unit price before any item-level discount
    pub original_price: Decimal,

    /// Unit price after an item-level discount, if one has been set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<Decimal>,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Number of units
    pub quantity: u32,

    /// Percentage recorded by the last applied discount
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub applied_discount: Option<Decimal>,

    /// Variant identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Colour label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Stock keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Discount tier chosen on the product page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_tier_id: Option<u64>,

    /// Flash discount committed to this line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash_discount_id: Option<u64>,
}

impl LineItem {
    /// Creates a line item with a single unit at its original price.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: impl Into<String>,
        original_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: size.into(),
            original_price,
            discounted_price: None,
            image: String::new(),
            quantity: 1,
            applied_discount: None,
            variant: None,
            color: None,
            sku: None,
            discount_tier_id: None,
            flash_discount_id: None,
        }
    }

    /// Sets the quantity, never below one.
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Sets a pre-discounted unit price.
    #[must_use]
    pub fn with_discounted_price(mut self, price: Decimal) -> Self {
        self.discounted_price = Some(price);
        self
    }

    /// Sets the image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Records the discount tier the price was taken from.
    #[must_use]
    pub fn with_discount_tier_id(mut self, tier_id: u64) -> Self {
        self.discount_tier_id = Some(tier_id);
        self
    }

    /// Sets the colour label.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Returns the identity key used for merge-on-add.
    pub fn key(&self) -> LineItemKey<'_> {
        LineItemKey {
            id: &self.id,
            size: &self.size,
        }
    }

    /// Returns the price actually charged per unit.
    pub fn unit_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.original_price)
    }

    /// Returns the price of all units on this line, saturating at [`Decimal::MAX`].
    pub fn line_total(&self) -> Decimal {
        self.unit_price().saturating_mul(Decimal::from(self.quantity))
    }

    /// Brings a stored or incoming line into a consistent state.
    ///
    /// The quantity is raised to at least one. A zero discounted price with no
    /// recorded percentage is the storefront's "no sale price" placeholder and
    /// is dropped, so the original price applies. A zero price produced by a
    /// recorded 100% discount is kept.
    pub fn normalise(&mut self) {
        self.quantity = self.quantity.max(1);

        if self.applied_discount.is_none()
            && self
                .discounted_price
                .is_some_and(|price| price.is_zero())
        {
            self.discounted_price = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn unit_price_falls_back_to_original() {
        let item = LineItem::new("A", "Air Max", "M", Decimal::new(5000, 2));

        assert_eq!(item.unit_price(), Decimal::new(5000, 2));
    }

    #[test]
    fn line_total_uses_discounted_price() {
        let item = LineItem::new("B", "Court Vision", "L", Decimal::new(3000, 2))
            .with_discounted_price(Decimal::new(2400, 2))
            .with_quantity(3);

        assert_eq!(item.line_total(), Decimal::new(7200, 2));
    }

    #[test]
    fn with_quantity_never_goes_below_one() {
        let item = LineItem::new("A", "Air Max", "M", Decimal::ONE).with_quantity(0);

        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn key_is_id_and_size() {
        let item = LineItem::new("A", "Air Max", "M", Decimal::ONE).with_color("red");

        assert_eq!(item.key(), LineItemKey { id: "A", size: "M" });
    }

    #[test]
    fn deserializes_storefront_json() -> TestResult {
        let json = r#"{
            "id": "42",
            "name": "Air Max 90",
            "size": "10",
            "originalPrice": "120.00",
            "discountedPrice": "96.00",
            "image": "https://cdn.example/airmax.png",
            "quantity": 2,
            "appliedDiscount": 20
        }"#;

        let item: LineItem = serde_json::from_str(json)?;

        assert_eq!(item.original_price, Decimal::new(12000, 2));
        assert_eq!(item.discounted_price, Some(Decimal::new(9600, 2)));
        assert_eq!(item.applied_discount, Some(Decimal::from(20)));
        assert_eq!(item.quantity, 2);
        assert!(item.color.is_none());

        Ok(())
    }

    #[test]
    fn deserializes_line_without_size_or_name() -> TestResult {
        let item: LineItem =
            serde_json::from_str(r#"{"id":"7","originalPrice":"15.00","quantity":1}"#)?;

        assert_eq!(item.size, "");
        assert_eq!(item.name, "");
        assert_eq!(item.unit_price(), Decimal::new(1500, 2));

        Ok(())
    }

    #[test]
    fn discount_ids_round_trip() -> TestResult {
        let json = r#"{"id":"42","name":"Air Max 90","size":"10","originalPrice":"120.00","quantity":1,"discountTierId":7,"flashDiscountId":3}"#;

        let item: LineItem = serde_json::from_str(json)?;

        assert_eq!(item.discount_tier_id, Some(7));
        assert_eq!(item.flash_discount_id, Some(3));

        let value = serde_json::to_value(&item)?;

        assert_eq!(value["discountTierId"], 7);
        assert_eq!(value["flashDiscountId"], 3);

        Ok(())
    }

    #[test]
    fn normalise_drops_zero_placeholder_price() -> TestResult {
        let mut item: LineItem = serde_json::from_str(
            r#"{"id":"9","name":"Blazer","size":"9","originalPrice":"85.00","discountedPrice":"0","quantity":0}"#,
        )?;

        item.normalise();

        assert_eq!(item.quantity, 1);
        assert_eq!(item.discounted_price, None);
        assert_eq!(item.unit_price(), Decimal::from(85));

        Ok(())
    }

    #[test]
    fn normalise_keeps_full_discount() {
        let mut item = LineItem::new("A", "Air Max", "M", Decimal::from(50));
        item.discounted_price = Some(Decimal::ZERO);
        item.applied_discount = Some(Decimal::ONE_HUNDRED);

        item.normalise();

        assert_eq!(item.unit_price(), Decimal::ZERO);
    }

    #[test]
    fn line_total_saturates() {
        let item = LineItem::new("A", "Air Max", "M", Decimal::MAX).with_quantity(3);

        assert_eq!(item.line_total(), Decimal::MAX);
    }

    #[test]
    fn serializes_prices_as_strings() -> TestResult {
        let item = LineItem::new("A", "Air Max", "M", Decimal::new(5000, 2));

        let value = serde_json::to_value(&item)?;

        assert_eq!(value["originalPrice"], "50.00");
        assert!(value.get("discountedPrice").is_none());

        Ok(())
    }
}
