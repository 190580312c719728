//! Quote configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// How diagnostics are written to stderr while quoting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// One line per event, for reading in a terminal.
    Compact,

    /// One JSON object per event, for piping into log tooling.
    Json,
}

/// Diagnostics for a quote run. Stdout carries only the breakdown, so these never mix with it.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Diagnostics filter; `debug` traces cart priming and every line item added
    #[arg(short = 'v', long = "verbosity", env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Diagnostics format on stderr
    #[arg(long, env = "CARTWRIGHT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Quote a payment form: price its cart and print the breakdown.
#[derive(Debug, Parser)]
#[command(name = "cartwright", about = "Price a payment form configuration", long_about = None)]
pub struct QuoteConfig {
    /// Path to the form configuration (YAML)
    #[arg(env = "CARTWRIGHT_FORM")]
    pub form: PathBuf,

    /// Submit button label template; `{{amount}}` is replaced with the amount due today
    #[arg(long, env = "CARTWRIGHT_LABEL", default_value = "Pay {{amount}}")]
    pub label: String,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_defaults() -> TestResult {
        let config = QuoteConfig::try_parse_from(["cartwright", "forms/basic.yml"])?;

        assert_eq!(config.form, PathBuf::from("forms/basic.yml"));
        assert_eq!(config.label, "Pay {{amount}}");
        assert_eq!(config.logging.log_format, LogFormat::Compact);

        Ok(())
    }

    #[test]
    fn parses_overrides() -> TestResult {
        let config = QuoteConfig::try_parse_from([
            "cartwright",
            "form.yml",
            "--label",
            "Subscribe for {{amount}}",
            "--log-format",
            "json",
            "-v",
            "debug",
        ])?;

        assert_eq!(config.label, "Subscribe for {{amount}}");
        assert_eq!(config.logging.log_format, LogFormat::Json);
        assert_eq!(config.logging.log_level, "debug");

        Ok(())
    }

    #[test]
    fn form_path_is_required() {
        assert!(QuoteConfig::try_parse_from(["cartwright"]).is_err());
    }
}
