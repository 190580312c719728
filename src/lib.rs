//! Cartwright
//!
//! Cartwright is the line-item pricing engine behind hosted-checkout payment forms: per-unit tax,
//! coupons, subtotals and the amount due today, all in integer minor currency units.

pub mod breakdown;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod currency;
pub mod forms;
pub mod line_items;
pub mod logging;
pub mod prelude;
pub mod tax;
