//! Cart
//!
//! The cart state and its transition function. A transition never mutates
//! the cart it is applied to; it returns the next cart alongside the change
//! it made, so whatever persists the cart always sees the post-transition
//! state.

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    pricing::{self, PricingError},
    products::{Product, ProductId},
};

/// Errors returned when a transition cannot be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// No entry with the given identifier is in the cart.
    #[error("product {0} is not in the cart")]
    NotFound(ProductId),

    /// Incrementing would overflow the entry's quantity.
    #[error("quantity of product {0} cannot be increased any further")]
    QuantityOverflow(ProductId),

    /// The same identifier appears more than once.
    #[error("product {0} appears more than once in the cart")]
    DuplicateEntry(ProductId),
}

/// Cart Entry
///
/// A product line with its quantity. The quantity is never zero; an entry
/// that would reach zero is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product on this line
    #[serde(flatten)]
    pub product: Product,

    /// Number of units
    pub quantity: NonZeroU32,
}

impl CartEntry {
    /// Create an entry holding a single unit of `product`.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Identifier of the product on this line.
    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Number of units on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }
}

/// Actions accepted by [`Cart::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product, creating its entry if needed.
    Add(Product),

    /// Add one unit to an existing entry.
    Increment(ProductId),

    /// Remove one unit from an existing entry, dropping the entry at zero.
    Decrement(ProductId),
}

impl CartAction {
    /// Identifier of the product the action targets.
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Add(product) => &product.id,
            Self::Increment(id) | Self::Decrement(id) => id,
        }
    }
}

/// What a transition did to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A new entry was appended with quantity 1.
    Added(CartEntry),

    /// An entry's quantity went up by one.
    Incremented(CartEntry),

    /// An entry's quantity went down by one.
    Decremented(CartEntry),

    /// An entry at quantity 1 was removed. Holds the entry as it was.
    Removed(CartEntry),
}

impl CartChange {
    /// The entry affected by the change.
    pub fn entry(&self) -> &CartEntry {
        match self {
            Self::Added(entry)
            | Self::Incremented(entry)
            | Self::Decremented(entry)
            | Self::Removed(entry) => entry,
        }
    }

    /// Quantity of the affected entry after the change; zero once removed.
    pub fn quantity(&self) -> u32 {
        match self {
            Self::Removed(_) => 0,
            _ => self.entry().quantity(),
        }
    }
}

/// The result of applying an action to a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The cart after the action
    pub cart: Cart,

    /// What changed
    pub change: CartChange,
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from existing entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateEntry`] if two entries share an identifier.
    pub fn from_entries(entries: impl Into<Vec<CartEntry>>) -> Result<Self, CartError> {
        let entries = entries.into();

        for (i, entry) in entries.iter().enumerate() {
            if entries
                .iter()
                .skip(i + 1)
                .any(|other| other.id() == entry.id())
            {
                return Err(CartError::DuplicateEntry(entry.id().clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Consume the cart, returning its entries.
    pub fn into_entries(self) -> Vec<CartEntry> {
        self.entries
    }

    /// Find the entry for a product.
    pub fn find(&self, id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry quantities.
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity()))
            .sum()
    }

    /// Sum of price times quantity over all entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a price cannot be converted to minor
    /// units or the money arithmetic fails.
    pub fn subtotal(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, PricingError> {
        pricing::subtotal(&self.entries, currency)
    }

    /// Apply an action, returning the next cart and the change made.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotFound`]: increment or decrement of an identifier
    ///   that is not in the cart.
    /// - [`CartError::QuantityOverflow`]: the entry is already at the
    ///   largest representable quantity.
    pub fn apply(&self, action: &CartAction) -> Result<Transition, CartError> {
        match action {
            CartAction::Add(product) => self.add(product),
            CartAction::Increment(id) => self.increment(id),
            CartAction::Decrement(id) => self.decrement(id),
        }
    }

    fn add(&self, product: &Product) -> Result<Transition, CartError> {
        if self.find(&product.id).is_some() {
            return self.increment(&product.id);
        }

        let entry = CartEntry::new(product.clone());

        let mut entries = self.entries.clone();
        entries.push(entry.clone());

        Ok(Transition {
            cart: Self { entries },
            change: CartChange::Added(entry),
        })
    }

    fn increment(&self, id: &ProductId) -> Result<Transition, CartError> {
        let mut entries = self.entries.clone();

        let entry = entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;

        entry.quantity = entry
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::QuantityOverflow(id.clone()))?;

        let updated = entry.clone();

        Ok(Transition {
            cart: Self { entries },
            change: CartChange::Incremented(updated),
        })
    }

    fn decrement(&self, id: &ProductId) -> Result<Transition, CartError> {
        let Some(position) = self.entries.iter().position(|entry| entry.id() == id) else {
            return Err(CartError::NotFound(id.clone()));
        };

        let mut entries = self.entries.clone();

        let Some(entry) = entries.get_mut(position) else {
            return Err(CartError::NotFound(id.clone()));
        };

        match entry.quantity().checked_sub(1).and_then(NonZeroU32::new) {
            Some(quantity) => {
                entry.quantity = quantity;
                let updated = entry.clone();

                Ok(Transition {
                    cart: Self { entries },
                    change: CartChange::Decremented(updated),
                })
            }
            None => {
                let removed = entries.remove(position);

                Ok(Transition {
                    cart: Self { entries },
                    change: CartChange::Removed(removed),
                })
            }
        }
    }
}
