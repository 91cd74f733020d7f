use clap::Args;
use marketplace::{pricing, prelude::*};
use rusty_money::iso::Currency;

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Product identifier
    id: String,
}

pub(crate) async fn list(cart: &CartContext, currency: &'static Currency) -> Result<(), String> {
    let products = cart.products().await;

    if products.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    for entry in &products {
        println!("{}", line(entry, currency)?);
    }

    Ok(())
}

pub(crate) async fn show(
    cart: &CartContext,
    currency: &'static Currency,
    args: ShowArgs,
) -> Result<(), String> {
    let id = ProductId::new(args.id);

    let Some(entry) = cart.product(&id).await else {
        return Err(CartError::NotFound(id).to_string());
    };

    println!("id: {}", entry.id());
    println!("title: {}", entry.product.title);
    println!("image_url: {}", entry.product.image_url);
    println!(
        "price: {}",
        pricing::unit_price(&entry, currency).map_err(|error| error.to_string())?
    );
    println!("quantity: {}", entry.quantity());

    Ok(())
}

pub(crate) async fn total(cart: &CartContext, currency: &'static Currency) -> Result<(), String> {
    let subtotal = cart
        .subtotal(currency)
        .await
        .map_err(|error| error.to_string())?;

    println!("items: {}", cart.total_quantity().await);
    println!("subtotal: {subtotal}");

    Ok(())
}

fn line(entry: &CartEntry, currency: &'static Currency) -> Result<String, String> {
    let total = pricing::line_total(entry, currency).map_err(|error| error.to_string())?;

    Ok(format!(
        "{} x {} ({}) {}",
        entry.quantity(),
        entry.product.title,
        entry.id(),
        total
    ))
}
