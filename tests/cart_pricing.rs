//! Integration tests for pricing a two line item cart.
//!
//! The cart holds four units of "Foo" at $12.00 and one "Bar" at $76.00, taxed at 5.575%:
//!
//! - Foo: unit tax round(66.9) = 67, tax 4 × 67 = 268, subtotal 4 × 1267 = 5068
//! - Bar: unit tax round(423.7) = 424, subtotal 8024
//! - Cart: subtotal 13092, tax 692
//!
//! Tax is folded into line item subtotals, so with no coupon the total equals the subtotal.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cartwright::prelude::*;

fn five_point_575_percent() -> Result<TaxRate, TaxRateError> {
    TaxRate::from_percent(Decimal::new(5575, 3))
}

fn foo_bar_cart() -> TestResult<Cart> {
    let mut cart = Cart::new(USD);

    cart.update(CartUpdate::new().tax_rate(five_point_575_percent()?));
    cart.add_line_item(LineItem::new("foo", "Foo", 1200, 4)?)?;
    cart.add_line_item(LineItem::new("bar", "Bar", 7600, 1)?)?;

    Ok(cart)
}

#[test]
fn line_item_tax_is_rounded_per_unit() -> TestResult {
    let cart = foo_bar_cart()?;

    assert_eq!(cart.line_item("foo")?.tax()?, 268);
    assert_eq!(cart.line_item("foo")?.subtotal()?, 5068);
    assert_eq!(cart.line_item("bar")?.tax()?, 424);
    assert_eq!(cart.line_item("bar")?.subtotal()?, 8024);

    Ok(())
}

#[test]
fn cart_tax_is_sum_of_line_item_tax() -> TestResult {
    let cart = foo_bar_cart()?;

    assert_eq!(cart.tax()?, Money::from_minor(692, USD));
    assert_eq!(cart.subtotal()?, Money::from_minor(13092, USD));

    Ok(())
}

#[test]
fn total_equals_subtotal_without_coupon() -> TestResult {
    let cart = foo_bar_cart()?;

    assert_eq!(cart.total()?, cart.subtotal()?);
    assert_eq!(cart.total_due_today()?, cart.total()?);

    Ok(())
}

#[test]
fn higher_rate_line_item_tax() -> TestResult {
    let mut cart = foo_bar_cart()?;

    // round(1200 × 0.23575) = round(282.9) = 283 per unit
    cart.update(CartUpdate::new().tax_rate(TaxRate::from_percent(Decimal::new(23575, 3))?));

    assert_eq!(cart.line_item("foo")?.tax()?, 1132);

    Ok(())
}

#[test]
fn amount_off_coupon_discount() -> TestResult {
    let mut cart = foo_bar_cart()?;

    cart.update(CartUpdate::new().coupon(Coupon::amount_off(1200)?));

    assert_eq!(cart.discount()?, Money::from_minor(1200, USD));
    assert_eq!(cart.total()?, Money::from_minor(11892, USD));

    Ok(())
}

#[test]
fn percent_off_coupon_discount() -> TestResult {
    let mut cart = foo_bar_cart()?;

    cart.update(CartUpdate::new().coupon(Coupon::percent_off(Decimal::from(12))?));

    // round(13092 × 0.12) = round(1571.04)
    assert_eq!(cart.discount()?, Money::from_minor(1571, USD));
    assert_eq!(cart.total()?, Money::from_minor(11521, USD));

    Ok(())
}

#[test]
fn replacing_and_clearing_the_coupon() -> TestResult {
    let mut cart = foo_bar_cart()?;

    cart.update(CartUpdate::new().coupon(Coupon::amount_off(1200)?));
    cart.update(CartUpdate::new().coupon(Coupon::percent_off(Decimal::from(12))?));

    assert_eq!(cart.discount()?, Money::from_minor(1571, USD));

    cart.update(CartUpdate::new().clear_coupon());

    assert_eq!(cart.discount()?, Money::from_minor(0, USD));
    assert_eq!(cart.total()?, cart.subtotal()?);

    Ok(())
}

#[test]
fn amounts_are_stable_across_reads() -> TestResult {
    let cart = foo_bar_cart()?;

    let first = cart.amounts()?;
    let second = cart.amounts()?;

    assert_eq!(first, second);
    assert_eq!(cart.tax()?, cart.tax()?);

    Ok(())
}

#[test]
fn duplicate_line_item_leaves_cart_unchanged() -> TestResult {
    let mut cart = foo_bar_cart()?;
    let before = cart.amounts()?;

    let result = cart.add_line_item(LineItem::new("foo", "Another Foo", 1, 1)?);

    assert_eq!(result, Err(CartError::DuplicateLineItemId("foo".to_string())));
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.line_item("foo")?.title(), "Foo");
    assert_eq!(cart.amounts()?, before);

    Ok(())
}

#[test]
fn removing_a_line_item_reprices_the_cart() -> TestResult {
    let mut cart = foo_bar_cart()?;

    let removed = cart.remove_line_item("bar")?;

    assert_eq!(removed.unit_price(), 7600);
    assert_eq!(cart.subtotal()?, Money::from_minor(5068, USD));
    assert_eq!(cart.tax()?, Money::from_minor(268, USD));
    assert!(matches!(
        cart.line_item("bar"),
        Err(CartError::LineItemNotFound(id)) if id == "bar"
    ));

    Ok(())
}

#[test]
fn separate_tax_is_added_after_discount() -> TestResult {
    let mut cart = Cart::with_inclusion(USD, TaxInclusion::Separate);

    cart.update(
        CartUpdate::new()
            .tax_rate(five_point_575_percent()?)
            .coupon(Coupon::amount_off(1200)?),
    );
    cart.add_line_item(LineItem::new("foo", "Foo", 1200, 4)?)?;
    cart.add_line_item(LineItem::new("bar", "Bar", 7600, 1)?)?;

    assert_eq!(cart.subtotal()?, Money::from_minor(12400, USD));
    assert_eq!(cart.tax()?, Money::from_minor(692, USD));
    // 12400 - 1200 + 692
    assert_eq!(cart.total()?, Money::from_minor(11892, USD));

    Ok(())
}

#[test]
fn line_items_iterate_in_insertion_order() -> TestResult {
    let cart = foo_bar_cart()?;

    let ids: Vec<&str> = cart.line_items().map(|item| item.id()).collect();
    let reversed: Vec<&str> = cart.line_items().rev().map(|item| item.id()).collect();

    assert_eq!(ids, ["foo", "bar"]);
    assert_eq!(reversed, ["bar", "foo"]);

    Ok(())
}
