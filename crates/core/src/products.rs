//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier, unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Product
///
/// A catalog product as handed to the cart, without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display title
    pub title: String,

    /// Image reference
    pub image_url: String,

    /// Unit price in major units, stored as a JSON number with every digit kept
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_id_serializes_as_plain_string() -> TestResult {
        let id = ProductId::new("sku-1");

        assert_eq!(serde_json::to_string(&id)?, "\"sku-1\"");
        assert_eq!(serde_json::from_str::<ProductId>("\"sku-1\"")?, id);

        Ok(())
    }

    #[test]
    fn product_price_reads_json_numbers() -> TestResult {
        let product: Product = serde_json::from_str(
            r#"{"id":"1","title":"Mug","image_url":"https://img/mug.png","price":12.5}"#,
        )?;

        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.price, Decimal::new(125, 1));

        Ok(())
    }

    #[test]
    fn product_price_keeps_every_digit() -> TestResult {
        let price = "0.1234567890123456789".parse::<Decimal>()?;
        let product = Product {
            id: ProductId::new("1"),
            title: "Mug".to_string(),
            image_url: String::new(),
            price,
        };

        let json = serde_json::to_string(&product)?;

        assert!(
            json.contains(r#""price":0.1234567890123456789"#),
            "price written as {json}"
        );
        assert_eq!(serde_json::from_str::<Product>(&json)?.price, price);

        Ok(())
    }
}
