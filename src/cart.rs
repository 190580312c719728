//! Cart
//!
//! An ordered set of line items plus a tax rate and an optional coupon. Every amount is derived
//! from the current state on each call; nothing is cached, so a change made through
//! [`Cart::update`] or [`Cart::add_line_item`] shows up in the next read.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    coupons::Coupon,
    currency::AmountError,
    line_items::{LineItem, LineItemError, PricedLineItem},
    tax::{TaxInclusion, TaxRate},
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line item was constructed with an invalid quantity or price.
    #[error(transparent)]
    InvalidLineItem(#[from] LineItemError),

    /// A line item with the same id is already in the cart.
    #[error("line item {0} is already in the cart")]
    DuplicateLineItemId(String),

    /// No line item with the given id.
    #[error("line item {0} not found")]
    LineItemNotFound(String),

    /// Amount arithmetic overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Changes to merge into a cart. Fields left unset keep their current values.
#[derive(Debug, Default, Clone, Copy)]
pub struct CartUpdate {
    currency: Option<&'static Currency>,
    tax_rate: Option<TaxRate>,
    coupon: Option<Option<Coupon>>,
}

impl CartUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cart currency.
    #[must_use]
    pub fn currency(mut self, currency: &'static Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    /// Replace the tax rate.
    #[must_use]
    pub fn tax_rate(mut self, tax_rate: TaxRate) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// Replace the coupon.
    #[must_use]
    pub fn coupon(mut self, coupon: Coupon) -> Self {
        self.coupon = Some(Some(coupon));
        self
    }

    /// Remove any coupon.
    #[must_use]
    pub fn clear_coupon(mut self) -> Self {
        self.coupon = Some(None);
        self
    }
}

/// Every derived amount of a cart at one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartAmounts<'a> {
    /// Sum of line item subtotals
    pub subtotal: Money<'a, Currency>,

    /// Coupon discount
    pub discount: Money<'a, Currency>,

    /// Sum of line item tax
    pub tax: Money<'a, Currency>,

    /// Amount charged for the cart
    pub total: Money<'a, Currency>,

    /// Amount charged at checkout, after deferring any trial
    pub total_due_today: Money<'a, Currency>,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    currency: &'static Currency,
    tax_rate: TaxRate,
    coupon: Option<Coupon>,
    inclusion: TaxInclusion,
    items: SmallVec<[LineItem; 4]>,
}

impl Cart {
    /// Create an empty cart whose line item tax is folded into the subtotal.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_inclusion(currency, TaxInclusion::FoldedIntoSubtotal)
    }

    /// Create an empty cart with the given tax inclusion policy.
    pub fn with_inclusion(currency: &'static Currency, inclusion: TaxInclusion) -> Self {
        Cart {
            currency,
            tax_rate: TaxRate::ZERO,
            coupon: None,
            inclusion,
            items: SmallVec::new(),
        }
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the tax rate of the cart.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Get the active coupon, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Get the tax inclusion policy.
    pub fn inclusion(&self) -> TaxInclusion {
        self.inclusion
    }

    /// Get the number of line items in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a line item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateLineItemId`] if an item with the same id is already in the
    /// cart. The cart is left unchanged.
    pub fn add_line_item(&mut self, item: LineItem) -> Result<(), CartError> {
        if self.position(item.id()).is_some() {
            return Err(CartError::DuplicateLineItemId(item.id().to_string()));
        }

        debug!(
            id = item.id(),
            unit_price = item.unit_price(),
            quantity = item.quantity(),
            "adding line item"
        );

        self.items.push(item);

        Ok(())
    }

    /// Remove a line item and return it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineItemNotFound`] if no item has the given id.
    pub fn remove_line_item(&mut self, id: &str) -> Result<LineItem, CartError> {
        let idx = self
            .position(id)
            .ok_or_else(|| CartError::LineItemNotFound(id.to_string()))?;

        debug!(id, "removing line item");

        Ok(self.items.remove(idx))
    }

    /// Look up a line item by id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineItemNotFound`] if no item has the given id.
    pub fn line_item(&self, id: &str) -> Result<PricedLineItem<'_>, CartError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .map(|item| self.priced(item))
            .ok_or_else(|| CartError::LineItemNotFound(id.to_string()))
    }

    /// Iterate over the line items in insertion order.
    pub fn line_items(
        &self,
    ) -> impl DoubleEndedIterator<Item = PricedLineItem<'_>> + ExactSizeIterator {
        self.items.iter().map(|item| self.priced(item))
    }

    /// Merge the provided fields into the cart.
    pub fn update(&mut self, update: CartUpdate) {
        if let Some(currency) = update.currency {
            self.currency = currency;
        }

        if let Some(tax_rate) = update.tax_rate {
            self.tax_rate = tax_rate;
        }

        if let Some(coupon) = update.coupon {
            self.coupon = coupon;
        }

        debug!(
            currency = self.currency.iso_alpha_code,
            tax_rate = %self.tax_rate,
            coupon = ?self.coupon,
            "updated cart"
        );
    }

    /// Whether any line item recurs.
    pub fn is_recurring(&self) -> bool {
        self.items.iter().any(|item| item.subscription().is_some())
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if the calculation overflows.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(self.money(self.subtotal_minor()?))
    }

    /// Calculate the tax of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if the calculation overflows.
    pub fn tax(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(self.money(self.tax_minor()?))
    }

    /// Calculate the coupon discount.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if the calculation overflows.
    pub fn discount(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(self.money(self.discount_minor()?))
    }

    /// Calculate the total of the cart.
    ///
    /// With [`TaxInclusion::FoldedIntoSubtotal`] this is `subtotal - discount`, as tax is
    /// already part of the subtotal. With [`TaxInclusion::Separate`] tax is added on top.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if the calculation overflows.
    pub fn total(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(self.money(self.total_minor()?))
    }

    /// Calculate the amount charged at checkout.
    ///
    /// Without a trial this is the total. When a line item's subscription starts with a
    /// trial, that item is deferred and only the remaining items (setup fees) are due.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if the calculation overflows.
    pub fn total_due_today(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(self.money(self.total_due_today_minor()?))
    }

    /// Calculate every derived amount at once.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::Amount`] if any calculation overflows.
    pub fn amounts(&self) -> Result<CartAmounts<'static>, CartError> {
        Ok(CartAmounts {
            subtotal: self.subtotal()?,
            discount: self.discount()?,
            tax: self.tax()?,
            total: self.total()?,
            total_due_today: self.total_due_today()?,
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn priced<'a>(&self, item: &'a LineItem) -> PricedLineItem<'a> {
        PricedLineItem::new(item, self.tax_rate, self.inclusion)
    }

    fn money(&self, minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, self.currency)
    }

    fn subtotal_minor(&self) -> Result<i64, AmountError> {
        sum_minor(self.line_items().map(|item| item.subtotal()))
    }

    fn tax_minor(&self) -> Result<i64, AmountError> {
        sum_minor(self.line_items().map(|item| item.tax()))
    }

    fn discount_minor(&self) -> Result<i64, AmountError> {
        match &self.coupon {
            None => Ok(0),
            Some(coupon) => coupon.discount(self.subtotal_minor()?),
        }
    }

    fn total_minor(&self) -> Result<i64, AmountError> {
        let discounted = self
            .subtotal_minor()?
            .checked_sub(self.discount_minor()?)
            .ok_or(AmountError::Overflow)?;

        match self.inclusion {
            TaxInclusion::FoldedIntoSubtotal => Ok(discounted),
            TaxInclusion::Separate => discounted
                .checked_add(self.tax_minor()?)
                .ok_or(AmountError::Overflow),
        }
    }

    fn total_due_today_minor(&self) -> Result<i64, AmountError> {
        if !self.items.iter().any(LineItem::is_trial) {
            return self.total_minor();
        }

        sum_minor(
            self.line_items()
                .filter(|item| !item.item().is_trial())
                .map(|item| self.charge_minor(&item)),
        )
    }

    /// What a single line item charges, tax included.
    fn charge_minor(&self, item: &PricedLineItem<'_>) -> Result<i64, AmountError> {
        match self.inclusion {
            TaxInclusion::FoldedIntoSubtotal => item.total(),
            TaxInclusion::Separate => item
                .total()?
                .checked_add(item.tax()?)
                .ok_or(AmountError::Overflow),
        }
    }
}

fn sum_minor(
    mut amounts: impl Iterator<Item = Result<i64, AmountError>>,
) -> Result<i64, AmountError> {
    amounts.try_fold(0_i64, |acc, amount| {
        acc.checked_add(amount?).ok_or(AmountError::Overflow)
    })
}
