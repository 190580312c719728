//! Forms
//!
//! Payment form configuration, loaded from YAML, and the priming of a [`Cart`] from it.

use std::{fs, io, path::Path};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Cart, CartError, CartUpdate},
    coupons::CouponError,
    currency::{AmountError, find_currency},
    line_items::{Interval, LineItem, Subscription},
    tax::{TaxInclusion, TaxRate, TaxRateError},
};

pub mod values;

pub use values::{AmountValue, CouponConfig, RateValue};

/// Id of the line item for the form's price.
pub const BASE_LINE_ITEM_ID: &str = "base";

/// Id of the line item for the form-level setup fee.
pub const SETUP_FEE_LINE_ITEM_ID: &str = "setup-fee";

/// Id of the line item for the price-level setup fee.
pub const PLAN_SETUP_FEE_LINE_ITEM_ID: &str = "plan-setup-fee";

/// Form configuration errors
#[derive(Debug, Error)]
pub enum FormError {
    /// IO error reading a configuration file
    #[error("Failed to read form configuration: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// An amount could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The tax rate is invalid
    #[error(transparent)]
    TaxRate(#[from] TaxRateError),

    /// The coupon is invalid
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Amount conversion or currency lookup failed
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The cart could not be primed
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Recurring options of a price
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RecurringConfig {
    /// Billing interval
    pub interval: Interval,

    /// Number of intervals between charges
    #[serde(default = "default_one")]
    pub interval_count: u32,

    /// Free trial length; a non-zero value defers the first charge
    #[serde(default)]
    pub trial_period_days: u32,
}

/// Price configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PriceConfig {
    /// Price of one unit
    pub unit_amount: AmountValue,

    /// ISO currency code (e.g., "usd")
    pub currency: String,

    /// Label for the base line item; falls back to the form title
    #[serde(default)]
    pub label: Option<String>,

    /// Recurring is optional and the customer chooses it
    #[serde(default)]
    pub can_recur: bool,

    /// Recurring options, when the price recurs
    #[serde(default)]
    pub recurring: Option<RecurringConfig>,

    /// Setup fee charged with the first invoice of this price
    #[serde(default)]
    pub setup_fee: Option<AmountValue>,
}

/// Payment form configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FormConfig {
    /// Form title
    #[serde(default = "default_title")]
    pub title: String,

    /// Price
    pub price: PriceConfig,

    /// Units of the price being bought
    #[serde(default = "default_one")]
    pub quantity: u32,

    /// The customer opted into recurring on a price that can recur
    #[serde(default)]
    pub recurring_selected: bool,

    /// Form-level setup fee for subscriptions
    #[serde(default)]
    pub setup_fee: Option<AmountValue>,

    /// Tax rate
    #[serde(default)]
    pub tax_rates: Option<RateValue>,

    /// Coupon
    #[serde(default)]
    pub coupon: Option<CouponConfig>,

    /// How line item tax is reported
    #[serde(default)]
    pub tax_inclusion: TaxInclusion,
}

fn default_one() -> u32 {
    1
}

fn default_title() -> String {
    "Payment".to_string()
}

impl FormConfig {
    /// Parse a form configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Yaml`] if the document is not a valid form configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, FormError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load a form configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// The form currency.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Amount`] if the currency code is unknown.
    pub fn currency(&self) -> Result<&'static Currency, FormError> {
        Ok(find_currency(&self.price.currency)?)
    }

    /// Whether the price is charged on a schedule.
    ///
    /// Prices that must recur always do; prices that can recur only do when the customer opted in.
    pub fn is_recurring(&self) -> bool {
        self.price.recurring.is_some() && (!self.price.can_recur || self.recurring_selected)
    }

    /// The subscription for the base line item, if the price recurs.
    pub fn subscription(&self) -> Option<Subscription> {
        if !self.is_recurring() {
            return None;
        }

        self.price.recurring.as_ref().map(|recurring| Subscription {
            is_trial: recurring.trial_period_days > 0,
            interval: recurring.interval,
            interval_count: recurring.interval_count,
        })
    }

    /// Prime a cart from this configuration.
    ///
    /// The cart holds the base price and, for subscriptions, any non-zero setup fees.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if any amount, rate, coupon or line item is invalid.
    pub fn cart(&self) -> Result<Cart, FormError> {
        let currency = self.currency()?;
        let mut cart = Cart::with_inclusion(currency, self.tax_inclusion);

        let mut update = CartUpdate::new();

        if let Some(rate) = &self.tax_rates {
            update = update.tax_rate(TaxRate::try_from(rate)?);
        }

        if let Some(coupon) = &self.coupon {
            update = update.coupon(coupon.to_coupon(currency)?);
        }

        cart.update(update);

        let title = self.price.label.as_deref().unwrap_or(&self.title);
        let unit_amount = self.price.unit_amount.to_minor(currency)?;
        let mut base = LineItem::new(BASE_LINE_ITEM_ID, title, unit_amount, self.quantity)
            .map_err(CartError::from)?;

        if let Some(subscription) = self.subscription() {
            base = base.with_subscription(subscription);
        }

        cart.add_line_item(base)?;

        if self.is_recurring() {
            let fees = [
                (SETUP_FEE_LINE_ITEM_ID, "Initial Setup Fee", &self.setup_fee),
                (
                    PLAN_SETUP_FEE_LINE_ITEM_ID,
                    "Plan Setup Fee",
                    &self.price.setup_fee,
                ),
            ];

            for (id, fee_title, fee) in fees {
                let Some(fee) = fee else {
                    continue;
                };

                let amount = fee.to_minor(currency)?;

                if amount != 0 {
                    cart.add_line_item(
                        LineItem::new(id, fee_title, amount, 1).map_err(CartError::from)?,
                    )?;
                }
            }
        }

        debug!(
            currency = currency.iso_alpha_code,
            line_items = cart.len(),
            recurring = cart.is_recurring(),
            "primed cart from form"
        );

        Ok(cart)
    }
}
