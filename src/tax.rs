//! Tax

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised when building a tax rate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRateError {
    /// Tax rates cannot be negative.
    #[error("tax rate cannot be negative: {0}")]
    Negative(Decimal),

    /// The value could not be parsed as a decimal or percentage.
    #[error("invalid tax rate: {0}")]
    Invalid(String),
}

/// A tax rate expressed as a decimal fraction (`0.05575` for 5.575%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// A zero tax rate.
    pub const ZERO: TaxRate = TaxRate(Decimal::ZERO);

    /// Create a tax rate from a decimal fraction.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Negative`] if the rate is below zero.
    pub fn new(decimal: Decimal) -> Result<Self, TaxRateError> {
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(TaxRateError::Negative(decimal));
        }

        Ok(TaxRate(decimal.normalize()))
    }

    /// Create a tax rate from percent points (`5.575` for 5.575%).
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Negative`] if the rate is below zero.
    pub fn from_percent(percent: Decimal) -> Result<Self, TaxRateError> {
        Self::new(percent / Decimal::ONE_HUNDRED)
    }

    /// The rate as a decimal fraction.
    pub fn decimal(&self) -> Decimal {
        self.0
    }

    /// Whether the rate is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl FromStr for TaxRate {
    type Err = TaxRateError;

    /// Parses either a percentage (`"5.575%"`) or a decimal fraction (`"0.05575"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(percent) = trimmed.strip_suffix('%') {
            let value = percent
                .trim()
                .parse::<Decimal>()
                .map_err(|_err| TaxRateError::Invalid(s.to_string()))?;

            return Self::from_percent(value);
        }

        let value = trimmed
            .parse::<Decimal>()
            .map_err(|_err| TaxRateError::Invalid(s.to_string()))?;

        Self::new(value)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * Decimal::ONE_HUNDRED).normalize())
    }
}

/// How line item tax relates to the amounts a cart reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxInclusion {
    /// Each unit's tax is baked into the line item subtotal and the cart total is
    /// `subtotal - discount`.
    ///
    /// Hosted checkout sessions take a single price per unit, so tax has to be folded in.
    #[default]
    FoldedIntoSubtotal,

    /// Line item subtotals exclude tax and the cart total is `subtotal - discount + tax`.
    ///
    /// For payment forms that send tax as its own line.
    Separate,
}
