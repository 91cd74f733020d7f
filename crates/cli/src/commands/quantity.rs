use clap::Args;
use marketplace::prelude::*;

use super::{describe, store_error};

#[derive(Debug, Args)]
pub(crate) struct QuantityArgs {
    /// Product identifier
    id: String,
}

pub(crate) async fn increment(cart: &CartContext, args: QuantityArgs) -> Result<(), String> {
    let change = cart
        .increment(ProductId::new(args.id))
        .await
        .map_err(|error| store_error(&error))?;

    println!("{}", describe(&change));

    Ok(())
}

pub(crate) async fn decrement(cart: &CartContext, args: QuantityArgs) -> Result<(), String> {
    let change = cart
        .decrement(ProductId::new(args.id))
        .await
        .map_err(|error| store_error(&error))?;

    println!("{}", describe(&change));

    Ok(())
}
