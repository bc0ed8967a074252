//! Checkout summary

use std::io;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    items::LineItem,
    pricing::{PricingError, to_money},
    storage::CartRepository,
};

use super::{Checkout, CheckoutTotals};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// An amount could not be formatted as money.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Writing to the output failed.
    #[error("failed to write summary: {0}")]
    Io(#[from] io::Error),
}

/// Writes the cart lines and checkout totals as a table.
///
/// # Errors
///
/// Returns a [`SummaryError`] if an amount overflows or the output cannot be written.
pub fn write_summary<R: CartRepository>(
    mut out: impl io::Write,
    cart: &Cart<R>,
    checkout: &Checkout,
) -> Result<(), SummaryError> {
    let currency = cart.currency();

    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Size", "Qty", "Unit Price", "Discount", "Line Total"]);

    for (idx, item) in cart.items().iter().enumerate() {
        push_line_row(&mut builder, idx, item, currency)?;
    }

    write_table(&mut out, builder)?;
    write_totals(&mut out, &checkout.totals(cart), checkout, currency)?;

    Ok(())
}

fn push_line_row(
    builder: &mut Builder,
    idx: usize,
    item: &LineItem,
    currency: &'static Currency,
) -> Result<(), SummaryError> {
    let unit_price = if item.unit_price() == item.original_price {
        to_money(item.original_price, currency)?.to_string()
    } else {
        format!(
            "{} (was {})",
            to_money(item.unit_price(), currency)?,
            to_money(item.original_price, currency)?
        )
    };

    let discount = item
        .applied_discount
        .map(|percentage| format!("{}%", percentage.round_dp(2).normalize()))
        .unwrap_or_default();

    builder.push_record([
        format!("#{}", idx + 1),
        item.name.clone(),
        item.size.clone(),
        item.quantity.to_string(),
        unit_price,
        discount,
        to_money(item.line_total(), currency)?.to_string(),
    ]);

    Ok(())
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), SummaryError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

fn write_totals(
    out: &mut impl io::Write,
    totals: &CheckoutTotals,
    checkout: &Checkout,
    currency: &'static Currency,
) -> Result<(), SummaryError> {
    let mut lines = vec![
        ("Subtotal:".to_string(), money(totals.subtotal, currency)?),
        (
            format!("Shipping ({}):", checkout.shipping().name()),
            money(totals.shipping, currency)?,
        ),
        ("Tax:".to_string(), money(totals.tax, currency)?),
    ];

    if let Some(coupon) = checkout.coupon() {
        lines.push((
            format!("Coupon {}:", coupon.code),
            format!("-{}", money(totals.discount, currency)?),
        ));
    }

    lines.push(("Total:".to_string(), money(totals.final_total, currency)?));

    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in lines {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn money(amount: Decimal, currency: &'static Currency) -> Result<String, PricingError> {
    Ok(to_money(amount, currency)?.to_string())
}
