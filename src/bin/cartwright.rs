//! Quote a payment form configuration.
//!
//! Prints the line item breakdown, the submit button label and the amount that would be sent to
//! the payment gateway.

use std::{io, io::Write};

use anyhow::{Result, bail};
use clap::Parser;

use cartwright::{
    breakdown::write_breakdown,
    checkout::{MoneyFormatter, prepare_submission},
    config::QuoteConfig,
    forms::FormConfig,
    logging::init_subscriber,
};

fn main() -> Result<()> {
    let config = QuoteConfig::parse();

    init_subscriber(&config.logging)?;

    let form = FormConfig::load(&config.form)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let mut shown = None;
    let submission = prepare_submission(&form, &config.label, &MoneyFormatter, |message| {
        shown = Some(message.to_string());
    });

    let submission = match submission {
        Ok(submission) => submission,
        Err(err) => {
            if let Some(message) = shown {
                writeln!(io::stderr(), "{message}")?;
            }

            bail!(err);
        }
    };

    write_breakdown(&mut handle, &submission.cart, &MoneyFormatter)?;

    writeln!(handle, " {}", submission.label)?;
    writeln!(
        handle,
        " gateway amount: {} {}",
        submission.session_amount.amount, submission.session_amount.currency
    )?;

    Ok(())
}
