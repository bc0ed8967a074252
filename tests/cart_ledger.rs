//! Integration tests for the cart ledger and its persistence

use std::fs;

use rust_decimal::Decimal;
use rusty_money::iso::{GBP, USD};
use testresult::TestResult;

use cart_ledger::{
    cart::Cart,
    items::LineItem,
    storage::{FileStore, KeyValueStore, MemoryStore, StorageKeys, StoreRepository},
};

fn two_line_cart<S: KeyValueStore>(store: S) -> Cart<StoreRepository<S>> {
    let mut cart = Cart::open(StoreRepository::new(store), USD);

    cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::new(5000, 2)).with_quantity(2));
    cart.add(
        LineItem::new("B", "Court Vision", "L", Decimal::new(3000, 2))
            .with_discounted_price(Decimal::new(2400, 2)),
    );

    cart
}

#[test]
fn mixed_discounted_lines_total_124() {
    let cart = two_line_cart(MemoryStore::new());

    assert_eq!(cart.total(), Decimal::new(12400, 2));
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.line_count(), 2);
}

#[test]
fn repeated_adds_merge_into_one_line() {
    let mut cart = Cart::open(StoreRepository::new(MemoryStore::new()), USD);

    for quantity in [1, 3, 2] {
        cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::from(50)).with_quantity(quantity));
    }

    cart.add(LineItem::new("A", "Air Max 90", "S", Decimal::from(50)));

    assert_eq!(cart.line_count(), 2);
    assert_eq!(cart.items().first().map(|item| item.quantity), Some(6));
}

#[test]
fn file_store_round_trip_restores_the_cart() -> TestResult {
    let dir = tempfile::tempdir()?;

    let saved = {
        let mut cart = two_line_cart(FileStore::open(dir.path())?);
        cart.apply_discount_to_item("A", Decimal::from(10));
        cart.update_quantity("B", 4);
        cart.snapshot().clone()
    };

    let reopened = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), USD);

    assert_eq!(reopened.snapshot(), &saved);
    assert_eq!(reopened.total(), Decimal::from(210));
    assert!(dir.path().join("cart.json").exists());

    Ok(())
}

#[test]
fn persisted_layout_uses_camel_case_fields() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut cart = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), USD);
    cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::new(5000, 2)));
    cart.apply_discount_to_item("A", Decimal::from(20));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("cart.json"))?)?;
    let line = json.get(0).ok_or("missing line")?;

    assert_eq!(line.get("originalPrice"), Some(&serde_json::json!("50.00")));
    assert_eq!(line.get("discountedPrice"), Some(&serde_json::json!("40.00")));
    assert_eq!(line.get("appliedDiscount"), Some(&serde_json::json!(20.0)));

    Ok(())
}

#[test]
fn corrupt_state_opens_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("cart.json"), "{not json")?;

    let mut cart = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), GBP);

    assert!(cart.is_empty());
    assert_eq!(cart.total(), Decimal::ZERO);

    cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::from(50)));

    let reopened = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), GBP);

    assert_eq!(reopened.line_count(), 1);

    Ok(())
}

#[test]
fn quota_failure_keeps_the_in_memory_mutation() {
    let mut cart = Cart::open(StoreRepository::new(MemoryStore::with_quota(16)), USD);

    cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::from(50)).with_quantity(2));

    assert_eq!(cart.total(), Decimal::from(100));
    assert!(cart.repository().store().is_empty());
}

#[test]
fn custom_storage_keys_are_honoured() -> TestResult {
    let dir = tempfile::tempdir()?;
    let keys = StorageKeys {
        items: "shop.cart".to_string(),
        flash_discounts: "shop.flash".to_string(),
    };

    let mut cart = Cart::open(
        StoreRepository::with_keys(FileStore::open(dir.path())?, keys),
        USD,
    );
    cart.add(LineItem::new("A", "Air Max 90", "M", Decimal::from(50)));

    assert!(dir.path().join("shop.cart.json").exists());
    assert!(!dir.path().join("cart.json").exists());

    Ok(())
}

#[test]
fn clear_empties_storage_state() -> TestResult {
    let dir = tempfile::tempdir()?;

    let mut cart = two_line_cart(FileStore::open(dir.path())?);
    cart.clear();

    let reopened = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), USD);

    assert!(reopened.is_empty());
    assert!(reopened.active_flash_discounts().is_empty());

    Ok(())
}

#[test]
fn storefront_written_cart_loads_and_keeps_tier_ids() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("cart.json"),
        r#"[
            {"id":"11","name":"Air Force 1","size":"9","originalPrice":"110.00","discountedPrice":"110.00","image":"/af1.png","quantity":1},
            {"id":"12","name":"Blazer Mid","size":"10","originalPrice":"85.00","discountedPrice":"0","image":"/blazer.png","quantity":2},
            {"id":"13","name":"Pegasus","size":"8","originalPrice":"130.00","discountedPrice":"104.00","image":"/peg.png","quantity":1,"appliedDiscount":20,"discountTierId":5},
            {"id":"14","name":"Socks","originalPrice":"12.00","discountedPrice":"12.00","image":"/socks.png","quantity":1}
        ]"#,
    )?;

    let mut cart = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), USD);

    assert_eq!(cart.line_count(), 4);
    assert_eq!(cart.total(), Decimal::from(396));

    cart.update_quantity("11", 1);

    let reopened = Cart::open(StoreRepository::new(FileStore::open(dir.path())?), USD);

    assert_eq!(
        reopened.get("13").and_then(|item| item.discount_tier_id),
        Some(5)
    );
    assert_eq!(reopened.total(), Decimal::from(506));

    Ok(())
}
