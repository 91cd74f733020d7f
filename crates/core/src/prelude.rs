//! Marketplace prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartAction, CartChange, CartEntry, CartError, Transition},
    context::{CartContext, CartContextError, CartProvider, Scope, use_cart},
    pricing::PricingError,
    products::{Product, ProductId},
    snapshot::SnapshotError,
    storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError},
    store::{CartStore, CartStoreError, DEFAULT_STORAGE_KEY},
};
