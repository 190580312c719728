//! Coupons
//!
//! A cart carries at most one coupon. Its discount is a pure function of the cart subtotal.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::{AmountError, scale_minor};

/// Errors raised when building a coupon.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// Percent off must be greater than zero and at most 100.
    #[error("percent off must be in (0, 100], got {0}")]
    PercentOutOfRange(Decimal),

    /// Amount off cannot be negative.
    #[error("amount off cannot be negative, got {0}")]
    NegativeAmount(i64),

    /// Neither `percent_off` nor `amount_off` was provided.
    #[error("coupon has neither percent_off nor amount_off")]
    Empty,
}

/// A discount descriptor applied to a whole cart.
#[derive(Debug, Clone, Copy)]
pub enum Coupon {
    /// Take a percentage off the cart subtotal (e.g., "12% off").
    PercentOff(Percentage),

    /// Take a flat amount off, in minor units of the cart currency (e.g., "$12 off").
    AmountOff(i64),
}

impl Coupon {
    /// Create a percent-off coupon from percent points (`12` for 12%).
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::PercentOutOfRange`] unless `0 < percent_off <= 100`.
    pub fn percent_off(percent_off: Decimal) -> Result<Self, CouponError> {
        if percent_off <= Decimal::ZERO || percent_off > Decimal::ONE_HUNDRED {
            return Err(CouponError::PercentOutOfRange(percent_off));
        }

        Ok(Coupon::PercentOff(Percentage::from(
            percent_off / Decimal::ONE_HUNDRED,
        )))
    }

    /// Create an amount-off coupon in minor units.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NegativeAmount`] if `amount_off` is negative.
    pub fn amount_off(amount_off: i64) -> Result<Self, CouponError> {
        if amount_off < 0 {
            return Err(CouponError::NegativeAmount(amount_off));
        }

        Ok(Coupon::AmountOff(amount_off))
    }

    /// Build a coupon from optional `percent_off` / `amount_off` fields.
    ///
    /// When both are present the percentage wins.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Empty`] if neither is present, or the validation error of the
    /// chosen variant.
    pub fn from_parts(
        percent_off: Option<Decimal>,
        amount_off: Option<i64>,
    ) -> Result<Self, CouponError> {
        match (percent_off, amount_off) {
            (Some(percent), _) => Self::percent_off(percent),
            (None, Some(amount)) => Self::amount_off(amount),
            (None, None) => Err(CouponError::Empty),
        }
    }

    /// The percent points taken off, for percent-off coupons.
    pub fn percent_points(&self) -> Option<Decimal> {
        match self {
            Coupon::PercentOff(percent) => Some((*percent * Decimal::ONE_HUNDRED).normalize()),
            Coupon::AmountOff(_) => None,
        }
    }

    /// The discount this coupon gives on a subtotal, in minor units.
    ///
    /// Percent-off discounts are rounded half away from zero. Amount-off discounts are returned
    /// as configured, whatever the subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the percentage calculation overflows.
    pub fn discount(&self, subtotal: i64) -> Result<i64, AmountError> {
        match self {
            Coupon::PercentOff(percent) => scale_minor(subtotal, *percent * Decimal::ONE),
            Coupon::AmountOff(amount) => Ok(*amount),
        }
    }
}
