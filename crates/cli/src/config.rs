//! Configuration

use std::path::PathBuf;

use clap::Args;
use marketplace::store::DEFAULT_STORAGE_KEY;
use rusty_money::{Findable, iso::Currency};

/// Cart storage settings.
#[derive(Debug, Args)]
pub(crate) struct CartConfig {
    /// Path of the key-value storage file
    #[arg(
        long,
        env = "CART_STORAGE_PATH",
        default_value = ".marketplace/storage.json",
        global = true
    )]
    pub(crate) storage_path: PathBuf,

    /// Storage key the cart snapshot lives under
    #[arg(long, env = "CART_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub(crate) storage_key: String,

    /// ISO 4217 currency used for totals
    #[arg(
        long,
        env = "CART_CURRENCY",
        default_value = "BRL",
        value_parser = parse_currency,
        global = true
    )]
    pub(crate) currency: &'static Currency,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub(crate) log_format: LogFormat,
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    Currency::find(&code.to_ascii_uppercase()).ok_or_else(|| format!("unknown currency code {code}"))
}
