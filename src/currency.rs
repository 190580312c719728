//! Currency
//!
//! Rounding and minor unit helpers shared by every amount calculation. Cart amounts are always
//! integers in the minor unit of their currency (cents for USD, whole yen for JPY); the helpers
//! here are the only place fractional money math is turned back into integers.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// Errors raised by amount arithmetic and currency lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The amount does not fit in an `i64` number of minor units.
    #[error("amount overflowed the minor unit range")]
    Overflow,

    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Round a fractional minor unit amount to a whole number of minor units.
///
/// Midpoints round away from zero, so `66.5` becomes `67` and `-66.5` becomes `-67`.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the rounded value does not fit in an `i64`.
pub fn round_minor(amount: Decimal) -> Result<i64, AmountError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::Overflow)
}

/// Multiply a minor unit amount by a decimal factor and round the result.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the product overflows.
pub fn scale_minor(minor: i64, factor: Decimal) -> Result<i64, AmountError> {
    Decimal::from(minor)
        .checked_mul(factor)
        .ok_or(AmountError::Overflow)
        .and_then(round_minor)
}

/// Look up an ISO currency by code, ignoring case (`"usd"` and `"USD"` both match).
///
/// # Errors
///
/// Returns [`AmountError::UnknownCurrency`] if the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static Currency, AmountError> {
    let code = code.trim().to_ascii_uppercase();

    iso::find(&code).ok_or(AmountError::UnknownCurrency(code))
}

/// Whether the currency has no fractional minor unit (e.g. JPY).
pub fn is_zero_decimal(currency: &Currency) -> bool {
    currency.exponent == 0
}

/// Convert a major unit amount (e.g. `12.50`) to minor units for the currency.
///
/// Two-decimal currencies are multiplied by 100. Zero-decimal currencies are not scaled, so
/// `500` JPY stays `500`.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the scaled amount does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, AmountError> {
    if is_zero_decimal(currency) {
        return round_minor(amount);
    }

    let factor = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(AmountError::Overflow)?;

    amount
        .checked_mul(Decimal::from(factor))
        .ok_or(AmountError::Overflow)
        .and_then(round_minor)
}

/// Convert minor units back to a major unit amount for the currency.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] if the currency exponent cannot be used as a decimal scale.
pub fn from_minor_units(minor: i64, currency: &Currency) -> Result<Decimal, AmountError> {
    Decimal::try_new(minor, currency.exponent).map_err(|_err| AmountError::Overflow)
}
