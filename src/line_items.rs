//! Line Items

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    currency::{AmountError, scale_minor},
    tax::{TaxInclusion, TaxRate},
};

/// Errors raised when constructing a line item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// A line item needs at least one unit.
    #[error("line item {0} has a quantity of zero")]
    ZeroQuantity(String),

    /// Unit prices cannot be negative.
    #[error("line item {id} has a negative unit price: {unit_price}")]
    NegativeUnitPrice {
        /// Line item id
        id: String,
        /// Offending unit price, in minor units
        unit_price: i64,
    },
}

/// Billing interval of a recurring price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Daily
    Day,
    /// Weekly
    Week,
    /// Monthly
    Month,
    /// Yearly
    Year,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
            Interval::Year => "year",
        })
    }
}

/// Recurring billing attached to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    /// Whether the first charge is deferred by a free trial.
    pub is_trial: bool,

    /// Billing interval
    pub interval: Interval,

    /// Number of intervals between charges
    pub interval_count: u32,
}

/// One billable row in a cart, such as the base price or a setup fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    id: String,
    title: String,
    unit_price: i64,
    quantity: u32,
    taxable: bool,
    subscription: Option<Subscription>,
}

impl LineItem {
    /// Create a taxable, non-recurring line item.
    ///
    /// `unit_price` is in minor units of the cart currency.
    ///
    /// # Errors
    ///
    /// - [`LineItemError::ZeroQuantity`]: `quantity` is zero.
    /// - [`LineItemError::NegativeUnitPrice`]: `unit_price` is below zero.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        unit_price: i64,
        quantity: u32,
    ) -> Result<Self, LineItemError> {
        let id = id.into();

        if quantity == 0 {
            return Err(LineItemError::ZeroQuantity(id));
        }

        if unit_price < 0 {
            return Err(LineItemError::NegativeUnitPrice { id, unit_price });
        }

        Ok(Self {
            id,
            title: title.into(),
            unit_price,
            quantity,
            taxable: true,
            subscription: None,
        })
    }

    /// Set whether tax applies to this item.
    #[must_use]
    pub fn with_taxable(mut self, taxable: bool) -> Self {
        self.taxable = taxable;
        self
    }

    /// Attach recurring billing to this item.
    #[must_use]
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    /// Line item id, unique within a cart.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Price of one unit, in minor units.
    pub fn unit_price(&self) -> i64 {
        self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether tax applies to this item.
    pub fn is_taxable(&self) -> bool {
        self.taxable
    }

    /// Recurring billing for this item, if any.
    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Whether this item's first charge is deferred by a trial.
    pub fn is_trial(&self) -> bool {
        self.subscription.is_some_and(|subscription| subscription.is_trial)
    }

    /// Tax on a single unit, rounded to a whole minor unit.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn unit_tax(&self, rate: TaxRate) -> Result<i64, AmountError> {
        if !self.taxable {
            return Ok(0);
        }

        scale_minor(self.unit_price, rate.decimal())
    }

    /// Tax across all units.
    ///
    /// Each unit is rounded on its own and the results are summed: three units of 50 at 1% pay
    /// `3 * round(0.5) = 3`, not `round(1.5) = 2`. Checkout prices every unit separately, so the
    /// per-unit figure is the one that gets charged.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn tax(&self, rate: TaxRate) -> Result<i64, AmountError> {
        self.unit_tax(rate)?
            .checked_mul(i64::from(self.quantity))
            .ok_or(AmountError::Overflow)
    }

    /// Subtotal across all units.
    ///
    /// With [`TaxInclusion::FoldedIntoSubtotal`] every unit contributes `unit_price + unit_tax`.
    /// With [`TaxInclusion::Separate`] tax is left out.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn subtotal(&self, rate: TaxRate, inclusion: TaxInclusion) -> Result<i64, AmountError> {
        let unit_amount = match inclusion {
            TaxInclusion::FoldedIntoSubtotal => self
                .unit_price
                .checked_add(self.unit_tax(rate)?)
                .ok_or(AmountError::Overflow)?,
            TaxInclusion::Separate => self.unit_price,
        };

        unit_amount
            .checked_mul(i64::from(self.quantity))
            .ok_or(AmountError::Overflow)
    }

    /// Total across all units.
    ///
    /// Subtotals are already whole minor units, so this is the subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn total(&self, rate: TaxRate, inclusion: TaxInclusion) -> Result<i64, AmountError> {
        self.subtotal(rate, inclusion)
    }
}

/// A line item viewed through the tax settings of the cart that owns it.
#[derive(Debug, Clone, Copy)]
pub struct PricedLineItem<'a> {
    item: &'a LineItem,
    rate: TaxRate,
    inclusion: TaxInclusion,
}

impl<'a> PricedLineItem<'a> {
    /// Pair a line item with a tax rate and inclusion policy.
    pub fn new(item: &'a LineItem, rate: TaxRate, inclusion: TaxInclusion) -> Self {
        Self {
            item,
            rate,
            inclusion,
        }
    }

    /// The underlying line item
    pub fn item(&self) -> &'a LineItem {
        self.item
    }

    /// Line item id
    pub fn id(&self) -> &'a str {
        self.item.id()
    }

    /// Display title
    pub fn title(&self) -> &'a str {
        self.item.title()
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.item.quantity()
    }

    /// Price of one unit, in minor units.
    pub fn unit_price(&self) -> i64 {
        self.item.unit_price()
    }

    /// See [`LineItem::tax`].
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn tax(&self) -> Result<i64, AmountError> {
        self.item.tax(self.rate)
    }

    /// See [`LineItem::subtotal`].
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn subtotal(&self) -> Result<i64, AmountError> {
        self.item.subtotal(self.rate, self.inclusion)
    }

    /// See [`LineItem::total`].
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the calculation overflows.
    pub fn total(&self) -> Result<i64, AmountError> {
        self.item.total(self.rate, self.inclusion)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::tax::TaxRateError;

    fn rate() -> Result<TaxRate, TaxRateError> {
        TaxRate::new(Decimal::new(5575, 5))
    }

    #[test]
    fn new_validates_quantity() {
        assert_eq!(
            LineItem::new("foo", "Foo", 100, 0),
            Err(LineItemError::ZeroQuantity("foo".to_string()))
        );
    }

    #[test]
    fn new_validates_unit_price() {
        assert_eq!(
            LineItem::new("foo", "Foo", -1, 1),
            Err(LineItemError::NegativeUnitPrice {
                id: "foo".to_string(),
                unit_price: -1,
            })
        );
    }

    #[test]
    fn accessors_return_configured_values() -> TestResult {
        let item = LineItem::new("foo", "Foo", 1200, 4)?;

        assert_eq!(item.id(), "foo");
        assert_eq!(item.title(), "Foo");
        assert_eq!(item.unit_price(), 1200);
        assert_eq!(item.quantity(), 4);
        assert!(item.is_taxable());
        assert!(item.subscription().is_none());

        Ok(())
    }

    #[test]
    fn tax_rounds_each_unit() -> TestResult {
        let item = LineItem::new("foo", "Foo", 1200, 4)?;

        assert_eq!(item.unit_tax(rate()?)?, 67);
        assert_eq!(item.tax(rate()?)?, 268);

        Ok(())
    }

    #[test]
    fn per_unit_rounding_differs_from_rounding_once() -> TestResult {
        // 50 * 0.01 = 0.5 per unit rounds to 1, so 3 units pay 3 rather than round(1.5) = 2.
        let rate = TaxRate::new(Decimal::new(1, 2))?;
        let item = LineItem::new("foo", "Foo", 50, 3)?;

        assert_eq!(item.tax(rate)?, 3);

        Ok(())
    }

    #[test]
    fn folded_subtotal_includes_unit_tax() -> TestResult {
        let item = LineItem::new("foo", "Foo", 1200, 4)?;

        assert_eq!(item.subtotal(rate()?, TaxInclusion::FoldedIntoSubtotal)?, 5068);
        assert_eq!(item.total(rate()?, TaxInclusion::FoldedIntoSubtotal)?, 5068);

        Ok(())
    }

    #[test]
    fn separate_subtotal_excludes_tax() -> TestResult {
        let item = LineItem::new("foo", "Foo", 1200, 4)?;

        assert_eq!(item.subtotal(rate()?, TaxInclusion::Separate)?, 4800);

        Ok(())
    }

    #[test]
    fn non_taxable_item_has_no_tax() -> TestResult {
        let item = LineItem::new("fee", "Setup fee", 500, 1)?.with_taxable(false);

        assert_eq!(item.tax(rate()?)?, 0);
        assert_eq!(item.subtotal(rate()?, TaxInclusion::FoldedIntoSubtotal)?, 500);

        Ok(())
    }

    #[test]
    fn trial_flag_reads_subscription() -> TestResult {
        let subscription = Subscription {
            is_trial: true,
            interval: Interval::Month,
            interval_count: 1,
        };
        let item = LineItem::new("base", "Plan", 1000, 1)?.with_subscription(subscription);

        assert!(item.is_trial());
        assert_eq!(item.subscription(), Some(&subscription));

        Ok(())
    }

    #[test]
    fn subtotal_overflow_returns_error() -> TestResult {
        let item = LineItem::new("foo", "Foo", i64::MAX, 2)?;

        assert_eq!(
            item.subtotal(TaxRate::ZERO, TaxInclusion::Separate),
            Err(AmountError::Overflow)
        );

        Ok(())
    }

    #[test]
    fn priced_line_item_uses_bound_rate() -> TestResult {
        let item = LineItem::new("bar", "Bar", 7600, 1)?;
        let priced = PricedLineItem::new(&item, rate()?, TaxInclusion::FoldedIntoSubtotal);

        assert_eq!(priced.id(), "bar");
        assert_eq!(priced.tax()?, 424);
        assert_eq!(priced.subtotal()?, 8024);
        assert_eq!(priced.total()?, 8024);

        Ok(())
    }

    #[test]
    fn interval_display() {
        assert_eq!(Interval::Month.to_string(), "month");
    }
}
