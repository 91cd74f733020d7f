use clap::Args;
use marketplace::prelude::*;
use rust_decimal::Decimal;

use super::{describe, store_error};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Product identifier
    #[arg(long)]
    id: String,

    /// Display title
    #[arg(long)]
    title: String,

    /// Image reference
    #[arg(long, default_value = "")]
    image_url: String,

    /// Unit price in major units, e.g. 12.50
    #[arg(long)]
    price: Decimal,
}

impl From<AddArgs> for Product {
    fn from(args: AddArgs) -> Self {
        Product {
            id: ProductId::new(args.id),
            title: args.title,
            image_url: args.image_url,
            price: args.price,
        }
    }
}

pub(crate) async fn run(cart: &CartContext, args: AddArgs) -> Result<(), String> {
    let change = cart
        .add_to_cart(args.into())
        .await
        .map_err(|error| store_error(&error))?;

    println!("{}", describe(&change));

    Ok(())
}
