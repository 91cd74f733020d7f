//! Cart Context
//!
//! View code reaches the cart through a [`Scope`]. A [`CartProvider`]
//! mounts a cart into a scope, and [`use_cart`] resolves it from that scope
//! or any of its descendants.

use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{CartChange, CartEntry},
    pricing::PricingError,
    products::{Product, ProductId},
    storage::KeyValueStorage,
    store::{CartStore, CartStoreError},
};

/// Errors raised when resolving the cart from a scope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartContextError {
    /// No provider is mounted in the scope or any of its ancestors.
    #[error("use_cart must be used within a CartProvider")]
    OutsideProvider,
}

/// Scope
///
/// A node of the view tree carrying values keyed by type. Lookups fall back
/// to the parent scope, so values provided higher up are visible below.
#[derive(Default)]
pub struct Scope {
    parent: Option<Arc<Scope>>,
    values: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("values", &self.values.len())
            .field("parent", &self.parent)
            .finish()
    }
}

impl Scope {
    /// Create a root scope with nothing provided.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create an empty scope below `parent`.
    pub fn child(parent: &Arc<Scope>) -> Self {
        Self {
            parent: Some(Arc::clone(parent)),
            values: FxHashMap::default(),
        }
    }

    /// Provide a value to this scope and its descendants, replacing any
    /// value of the same type provided here before.
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Find the nearest value of type `T`.
    pub fn obtain<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
            .or_else(|| self.parent.as_deref().and_then(Scope::obtain::<T>))
    }
}

/// Cart Provider
///
/// Makes a cart store available to a scope.
#[derive(Debug, Clone)]
pub struct CartProvider {
    store: Arc<CartStore>,
}

impl CartProvider {
    /// Provide an already loaded store.
    pub fn new(store: Arc<CartStore>) -> Self {
        Self { store }
    }

    /// Load the cart persisted under `key` and provide it.
    ///
    /// # Errors
    ///
    /// Returns a [`CartStoreError`] if the persisted cart cannot be loaded.
    pub async fn load(
        storage: Arc<dyn KeyValueStorage>,
        key: impl Into<String>,
    ) -> Result<Self, CartStoreError> {
        Ok(Self::new(Arc::new(CartStore::load(storage, key).await?)))
    }

    /// Mount the cart into `scope`.
    pub fn mount(&self, scope: &mut Scope) {
        scope.provide(CartContext {
            store: Arc::clone(&self.store),
        });

        debug!(key = self.store.key(), "mounted cart");
    }
}

/// Handle to the mounted cart, as seen by consumers.
#[derive(Debug, Clone)]
pub struct CartContext {
    store: Arc<CartStore>,
}

impl CartContext {
    /// The products in the cart, in insertion order.
    pub async fn products(&self) -> Vec<CartEntry> {
        self.store.entries().await
    }

    /// The entry for `id`, if it is in the cart.
    pub async fn product(&self, id: &ProductId) -> Option<CartEntry> {
        self.store.find(id).await
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::dispatch`].
    pub async fn add_to_cart(&self, product: Product) -> Result<CartChange, CartStoreError> {
        self.store.add(product).await
    }

    /// Add one unit to the entry for `id`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::increment`].
    pub async fn increment(&self, id: ProductId) -> Result<CartChange, CartStoreError> {
        self.store.increment(id).await
    }

    /// Remove one unit from the entry for `id`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::decrement`].
    pub async fn decrement(&self, id: ProductId) -> Result<CartChange, CartStoreError> {
        self.store.decrement(id).await
    }

    /// Sum of all quantities.
    pub async fn total_quantity(&self) -> u64 {
        self.store.total_quantity().await
    }

    /// Cart subtotal in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if an entry cannot be priced.
    pub async fn subtotal(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, PricingError> {
        self.store.subtotal(currency).await
    }
}

/// Resolve the cart mounted in `scope` or the nearest ancestor.
///
/// # Errors
///
/// Returns [`CartContextError::OutsideProvider`] if no cart is mounted.
pub fn use_cart(scope: &Scope) -> Result<CartContext, CartContextError> {
    scope
        .obtain::<CartContext>()
        .cloned()
        .ok_or(CartContextError::OutsideProvider)
}
