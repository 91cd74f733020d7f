//! Pricing

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{cart::CartEntry, products::ProductId};

/// Errors that can occur while pricing cart entries.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The price could not be expressed in minor units of the currency.
    #[error("price of product {0} cannot be represented in minor units")]
    Conversion(ProductId),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Unit price of an entry in the given currency.
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the price overflows once scaled to minor units.
pub fn unit_price(
    entry: &CartEntry,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = to_minor_units(entry.product.price, currency)
        .ok_or_else(|| PricingError::Conversion(entry.id().clone()))?;

    Ok(Money::from_minor(minor, currency))
}

/// Price of an entry multiplied by its quantity.
///
/// # Errors
///
/// Returns [`PricingError::Conversion`] if the price or the line total overflows.
pub fn line_total(
    entry: &CartEntry,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = to_minor_units(entry.product.price, currency)
        .and_then(|unit| unit.checked_mul(i64::from(entry.quantity())))
        .ok_or_else(|| PricingError::Conversion(entry.id().clone()))?;

    Ok(Money::from_minor(minor, currency))
}

/// Sum of the line totals of all entries. An empty list totals zero.
///
/// # Errors
///
/// - [`PricingError::Conversion`]: a line total could not be computed.
/// - [`PricingError::Money`]: wrapped money arithmetic error.
pub fn subtotal(
    entries: &[CartEntry],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    entries
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, entry| {
            Ok(acc.add(line_total(entry, currency)?)?)
        })
}

/// Scale a major-unit price to minor units, rounding half away from zero.
fn to_minor_units(price: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    price
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
