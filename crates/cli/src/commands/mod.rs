use std::sync::Arc;

use clap::{Parser, Subcommand};
use marketplace::prelude::*;
use tracing::debug;

use crate::config::{CartConfig, LoggingConfig};

mod add;
mod list;
mod quantity;

#[derive(Debug, Parser)]
#[command(name = "marketplace", about = "Marketplace cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: CartConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the products in the cart
    List,
    /// Show a single cart entry
    Show(list::ShowArgs),
    /// Show the item count and subtotal
    Total,
    /// Add one unit of a product
    Add(add::AddArgs),
    /// Add one unit to a product already in the cart
    Increment(quantity::QuantityArgs),
    /// Remove one unit of a product from the cart
    Decrement(quantity::QuantityArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let storage = Arc::new(FileStorage::new(&self.config.storage_path));

        debug!(
            path = %storage.path().display(),
            key = %self.config.storage_key,
            "opening cart storage"
        );

        let mut scope = Scope::root();

        CartProvider::load(storage, self.config.storage_key)
            .await
            .map_err(|error| format!("failed to load cart: {}", store_error(&error)))?
            .mount(&mut scope);

        let cart = use_cart(&scope).map_err(|error| error.to_string())?;
        let currency = self.config.currency;

        match self.command {
            Commands::List => list::list(&cart, currency).await,
            Commands::Show(args) => list::show(&cart, currency, args).await,
            Commands::Total => list::total(&cart, currency).await,
            Commands::Add(args) => add::run(&cart, args).await,
            Commands::Increment(args) => quantity::increment(&cart, args).await,
            Commands::Decrement(args) => quantity::decrement(&cart, args).await,
        }
    }
}

/// One-line summary of a committed change.
fn describe(change: &CartChange) -> String {
    let entry = change.entry();

    match change {
        CartChange::Added(_) => format!("added {} ({})", entry.product.title, entry.id()),
        CartChange::Incremented(_) | CartChange::Decremented(_) => format!(
            "{} ({}) quantity is now {}",
            entry.product.title,
            entry.id(),
            entry.quantity()
        ),
        CartChange::Removed(_) => format!("removed {} ({})", entry.product.title, entry.id()),
    }
}

fn store_error(error: &CartStoreError) -> String {
    match error {
        CartStoreError::Cart(error) => error.to_string(),
        CartStoreError::Snapshot(source) => format!("{error}: {source}"),
        CartStoreError::Storage(source) => format!("{error}: {source}"),
        CartStoreError::Commit(source) => format!("{error}: {source}"),
    }
}
