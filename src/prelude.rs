//! Cartwright prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    breakdown::{BreakdownError, write_breakdown},
    cart::{Cart, CartAmounts, CartError, CartUpdate},
    checkout::{
        AmountFormatter, CheckoutError, CheckoutSummary, MoneyFormatter, SessionAmount,
        Submission, prepare_submission, submit_label,
    },
    coupons::{Coupon, CouponError},
    currency::{AmountError, find_currency, is_zero_decimal},
    forms::{FormConfig, FormError},
    line_items::{Interval, LineItem, LineItemError, PricedLineItem, Subscription},
    tax::{TaxInclusion, TaxRate, TaxRateError},
};
