//! Form Values
//!
//! Loosely typed values as they appear in form configuration files, and their conversions into
//! the strongly typed amounts used by the cart.

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    coupons::Coupon,
    currency::to_minor_units,
    forms::FormError,
    tax::{TaxRate, TaxRateError},
};

/// A money amount from YAML.
///
/// Integers are taken as minor units (`1200` is $12.00). Strings are major units (`"12.00"`)
/// and are converted for the form currency, so `"500"` JPY stays `500`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AmountValue {
    /// Amount already in minor units
    Minor(i64),

    /// Amount in major units, as text
    Major(String),
}

impl AmountValue {
    /// Resolve to minor units of the given currency.
    ///
    /// # Errors
    ///
    /// - [`FormError::InvalidAmount`]: the text is not a decimal number, or has more decimal
    ///   places than the currency's minor unit.
    /// - [`FormError::Amount`]: the amount does not fit in minor units.
    pub fn to_minor(&self, currency: &Currency) -> Result<i64, FormError> {
        match self {
            AmountValue::Minor(minor) => Ok(*minor),
            AmountValue::Major(text) => {
                let amount = text
                    .trim()
                    .parse::<Decimal>()
                    .map_err(|_err| FormError::InvalidAmount(text.clone()))?;

                if amount.normalize().scale() > currency.exponent {
                    return Err(FormError::InvalidAmount(text.clone()));
                }

                Ok(to_minor_units(amount, currency)?)
            }
        }
    }
}

/// A tax rate from YAML: a decimal fraction (`0.05575`) or a string (`"5.575%"`, `"0.05575"`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RateValue {
    /// Decimal fraction
    Fraction(f64),

    /// Percentage or fraction, as text
    Text(String),
}

impl TryFrom<&RateValue> for TaxRate {
    type Error = TaxRateError;

    fn try_from(value: &RateValue) -> Result<Self, Self::Error> {
        match value {
            RateValue::Fraction(fraction) => {
                let decimal = Decimal::from_f64(*fraction)
                    .ok_or_else(|| TaxRateError::Invalid(fraction.to_string()))?;

                TaxRate::new(decimal)
            }
            RateValue::Text(text) => text.parse(),
        }
    }
}

/// Coupon descriptor from YAML.
///
/// `percent_off` is in percent points (`12` for 12%); `amount_off` follows [`AmountValue`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CouponConfig {
    /// Percent off the subtotal
    #[serde(default)]
    pub percent_off: Option<f64>,

    /// Flat amount off
    #[serde(default)]
    pub amount_off: Option<AmountValue>,
}

impl CouponConfig {
    /// Build the coupon for a form currency. `percent_off` wins if both are set.
    ///
    /// # Errors
    ///
    /// Returns a [`FormError`] if an amount cannot be resolved or the coupon is invalid.
    pub fn to_coupon(&self, currency: &Currency) -> Result<Coupon, FormError> {
        let percent_off = self
            .percent_off
            .map(|percent| {
                Decimal::from_f64(percent)
                    .ok_or_else(|| FormError::InvalidAmount(percent.to_string()))
            })
            .transpose()?;

        let amount_off = self
            .amount_off
            .as_ref()
            .map(|amount| amount.to_minor(currency))
            .transpose()?;

        Ok(Coupon::from_parts(percent_off, amount_off)?)
    }
}
