//! Breakdown
//!
//! Renders a cart as a table of line items followed by its totals.

use std::io;

use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartAmounts, CartError},
    checkout::AmountFormatter,
    currency::AmountError,
};

/// Errors that can occur when writing a breakdown.
#[derive(Debug, Error)]
pub enum BreakdownError {
    /// Cart amounts could not be calculated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A line item amount could not be calculated.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write the cart breakdown.
///
/// # Errors
///
/// Returns a [`BreakdownError`] if an amount cannot be calculated or the output fails.
pub fn write_breakdown(
    mut out: impl io::Write,
    cart: &Cart,
    formatter: &impl AmountFormatter,
) -> Result<(), BreakdownError> {
    let money = |minor: i64| formatter.format(&Money::from_minor(minor, cart.currency()));

    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit Price", "Tax", "Subtotal"]);

    for item in cart.line_items() {
        let title = match item.item().subscription() {
            Some(subscription) if subscription.is_trial => format!("{} (trial)", item.title()),
            _ => item.title().to_string(),
        };

        builder.push_record([
            title,
            item.quantity().to_string(),
            money(item.unit_price()),
            money(item.tax()?),
            money(item.subtotal()?),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..5), Alignment::right());

    writeln!(out, "\n{table}")?;

    write_summary(&mut out, cart, &cart.amounts()?, formatter)?;

    Ok(())
}

fn write_summary(
    out: &mut impl io::Write,
    cart: &Cart,
    amounts: &CartAmounts<'_>,
    formatter: &impl AmountFormatter,
) -> Result<(), BreakdownError> {
    let mut lines = vec![("Subtotal:".to_string(), formatter.format(&amounts.subtotal))];

    if let Some(coupon) = cart.coupon() {
        let label = match coupon.percent_points() {
            Some(points) => format!("Discount ({points}%):"),
            None => "Discount:".to_string(),
        };

        lines.push((label, format!("-{}", formatter.format(&amounts.discount))));
    }

    if !cart.tax_rate().is_zero() {
        lines.push((
            format!("Tax ({}):", cart.tax_rate()),
            formatter.format(&amounts.tax),
        ));
    }

    lines.push(("Total:".to_string(), formatter.format(&amounts.total)));

    if amounts.total_due_today != amounts.total {
        lines.push((
            "Due today:".to_string(),
            formatter.format(&amounts.total_due_today),
        ));
    }

    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

    for (label, value) in &lines {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
