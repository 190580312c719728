//! Checkout
//!
//! Turns a payment form into the amounts a checkout submission needs: the breakdown, the
//! submit button label and the amount sent to the payment gateway. Formatting and error
//! display are supplied by the caller.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    cart::{Cart, CartError},
    forms::{FormConfig, FormError},
};

/// Placeholder replaced by the formatted amount in submit label templates.
pub const AMOUNT_PLACEHOLDER: &str = "{{amount}}";

/// Message shown to customers when a submission cannot be prepared.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Unable to process this payment form. Please contact the site owner.";

/// Errors raised while preparing a checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form configuration is invalid.
    #[error(transparent)]
    Form(#[from] FormError),

    /// Cart amounts could not be calculated.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Formats money amounts for display.
pub trait AmountFormatter {
    /// Format an amount.
    fn format(&self, amount: &Money<'_, Currency>) -> String;
}

/// Formats amounts with the currency's own symbol and separators (e.g., "$1,234.50", "¥500").
#[derive(Debug, Default, Clone, Copy)]
pub struct MoneyFormatter;

impl AmountFormatter for MoneyFormatter {
    fn format(&self, amount: &Money<'_, Currency>) -> String {
        amount.to_string()
    }
}

/// Amounts shown to the customer for a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary {
    /// Cart currency
    pub currency: &'static Currency,

    /// Sum of line item subtotals
    pub subtotal: Money<'static, Currency>,

    /// Coupon discount
    pub discount: Money<'static, Currency>,

    /// Tax
    pub tax: Money<'static, Currency>,

    /// Total
    pub total: Money<'static, Currency>,

    /// Amount charged at checkout
    pub total_due_today: Money<'static, Currency>,

    /// Whether the cart recurs
    pub recurring: bool,
}

impl CheckoutSummary {
    /// Summarise a cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if an amount cannot be calculated.
    pub fn from_cart(cart: &Cart) -> Result<Self, CartError> {
        let amounts = cart.amounts()?;

        Ok(Self {
            currency: cart.currency(),
            subtotal: amounts.subtotal,
            discount: amounts.discount,
            tax: amounts.tax,
            total: amounts.total,
            total_due_today: amounts.total_due_today,
            recurring: cart.is_recurring(),
        })
    }
}

/// The amount handed to the payment gateway when creating a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAmount {
    /// Amount in minor units
    pub amount: i64,

    /// Lowercase ISO currency code, as the gateway expects it
    pub currency: String,
}

impl SessionAmount {
    /// The amount due today for a summary.
    pub fn from_summary(summary: &CheckoutSummary) -> Self {
        Self {
            amount: summary.total_due_today.to_minor_units(),
            currency: summary.currency.iso_alpha_code.to_ascii_lowercase(),
        }
    }
}

/// Everything needed to submit a payment form.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The primed cart
    pub cart: Cart,

    /// Amount breakdown
    pub summary: CheckoutSummary,

    /// Rendered submit button label
    pub label: String,

    /// Amount sent to the payment gateway
    pub session_amount: SessionAmount,
}

/// Render a submit button label, replacing `{{amount}}` with the formatted amount.
pub fn submit_label(
    template: &str,
    amount: &Money<'_, Currency>,
    formatter: &impl AmountFormatter,
) -> String {
    template.replace(AMOUNT_PLACEHOLDER, &formatter.format(amount))
}

/// Prepare a payment form submission.
///
/// On failure `on_error` receives [`GENERIC_ERROR_MESSAGE`] for display, the detailed error is
/// logged, and the error is returned.
///
/// # Errors
///
/// Returns a [`CheckoutError`] if the form is misconfigured or an amount cannot be calculated.
pub fn prepare_submission(
    form: &FormConfig,
    label_template: &str,
    formatter: &impl AmountFormatter,
    on_error: impl FnOnce(&str),
) -> Result<Submission, CheckoutError> {
    match build_submission(form, label_template, formatter) {
        Ok(submission) => Ok(submission),
        Err(err) => {
            error!(error = %err, form = %form.title, "aborting payment form submission");
            on_error(GENERIC_ERROR_MESSAGE);

            Err(err)
        }
    }
}

fn build_submission(
    form: &FormConfig,
    label_template: &str,
    formatter: &impl AmountFormatter,
) -> Result<Submission, CheckoutError> {
    let cart = form.cart()?;
    let summary = CheckoutSummary::from_cart(&cart)?;
    let label = submit_label(label_template, &summary.total_due_today, formatter);
    let session_amount = SessionAmount::from_summary(&summary);

    debug!(
        amount = session_amount.amount,
        currency = %session_amount.currency,
        "prepared payment form submission"
    );

    Ok(Submission {
        cart,
        summary,
        label,
        session_amount,
    })
}
