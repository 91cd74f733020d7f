//! Cart Store
//!
//! Owns the live cart and mirrors every committed change into storage.

use std::sync::Arc;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinError};
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartAction, CartChange, CartEntry, CartError},
    pricing::PricingError,
    products::{Product, ProductId},
    snapshot::{self, SnapshotError},
    storage::{KeyValueStorage, StorageError},
};

/// Storage key the mobile client has always used for the cart.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

/// Cart store errors.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The action was rejected by the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The persisted snapshot could not be read or written.
    #[error("cart snapshot error")]
    Snapshot(#[from] SnapshotError),

    /// The storage backend failed.
    #[error("cart storage error")]
    Storage(#[from] StorageError),

    /// The task writing and committing the change did not finish.
    #[error("cart commit aborted")]
    Commit(#[from] JoinError),
}

/// Cart Store
///
/// Every mutation runs the transition, writes the resulting cart under the
/// storage key and only then commits it in memory, all while holding the
/// state lock. The persisted snapshot therefore always matches the cart as
/// of the last successful mutation, even when a caller stops waiting on a
/// mutation part way through.
pub struct CartStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    cart: Arc<Mutex<Cart>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart persisted under `key`, or start empty if there is none.
    ///
    /// # Errors
    ///
    /// - [`CartStoreError::Storage`]: the storage read failed.
    /// - [`CartStoreError::Snapshot`]: the stored snapshot is not a valid cart.
    pub async fn load(
        storage: Arc<dyn KeyValueStorage>,
        key: impl Into<String>,
    ) -> Result<Self, CartStoreError> {
        let key = key.into();

        let cart = match storage.get_item(&key).await? {
            Some(stored) => snapshot::decode(&stored)?,
            None => Cart::new(),
        };

        debug!(key = %key, entries = cart.len(), "loaded cart");

        Ok(Self {
            storage,
            key,
            cart: Arc::new(Mutex::new(cart)),
        })
    }

    /// Storage key the cart is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply an action, persist the resulting cart and commit it.
    ///
    /// Rejected actions leave both the cart and storage untouched. If the
    /// write fails the in-memory cart also stays as it was.
    ///
    /// Once the action is accepted, the write and the commit run on their own
    /// task holding the state lock. Dropping the returned future does not
    /// stop them, and later calls wait until they are done.
    ///
    /// # Errors
    ///
    /// - [`CartStoreError::Cart`]: the action was rejected.
    /// - [`CartStoreError::Snapshot`]: the new cart could not be encoded.
    /// - [`CartStoreError::Storage`]: the write failed.
    /// - [`CartStoreError::Commit`]: the commit task panicked.
    pub async fn dispatch(&self, action: &CartAction) -> Result<CartChange, CartStoreError> {
        let mut cart = Arc::clone(&self.cart).lock_owned().await;

        let transition = cart.apply(action)?;
        let encoded = snapshot::encode(&transition.cart)?;

        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        let product = action.product_id().clone();

        let commit = tokio::spawn(async move {
            if let Err(error) = storage.set_item(&key, encoded).await {
                warn!(key = %key, product = %product, "failed to persist cart: {error}");

                return Err(error);
            }

            *cart = transition.cart;

            debug!(
                product = %transition.change.entry().id(),
                quantity = transition.change.quantity(),
                "committed cart change"
            );

            Ok(transition.change)
        });

        Ok(commit.await??)
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::dispatch`].
    pub async fn add(&self, product: Product) -> Result<CartChange, CartStoreError> {
        self.dispatch(&CartAction::Add(product)).await
    }

    /// Add one unit to the entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] (wrapped) if there is no such entry,
    /// otherwise see [`CartStore::dispatch`].
    pub async fn increment(&self, id: ProductId) -> Result<CartChange, CartStoreError> {
        self.dispatch(&CartAction::Increment(id)).await
    }

    /// Remove one unit from the entry for `id`, dropping the entry at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] (wrapped) if there is no such entry,
    /// otherwise see [`CartStore::dispatch`].
    pub async fn decrement(&self, id: ProductId) -> Result<CartChange, CartStoreError> {
        self.dispatch(&CartAction::Decrement(id)).await
    }

    /// A copy of the current cart.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    /// The current entries, in insertion order.
    pub async fn entries(&self) -> Vec<CartEntry> {
        self.cart().await.into_entries()
    }

    /// The current entry for `id`, if present.
    pub async fn find(&self, id: &ProductId) -> Option<CartEntry> {
        self.cart.lock().await.find(id).cloned()
    }

    /// Sum of all quantities.
    pub async fn total_quantity(&self) -> u64 {
        self.cart.lock().await.total_quantity()
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
        self.cart.lock().await.subtotal(currency)
    }
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rusty_money::iso;
    use testresult::TestResult;
    use tokio::time::{sleep, timeout};

    use crate::storage::{MemoryStorage, MockKeyValueStorage};

    use super::*;

    /// Memory storage whose writes take a while to land.
    struct SlowStorage {
        inner: MemoryStorage,
        delay: Duration,
    }

    #[async_trait]
    impl KeyValueStorage for SlowStorage {
        async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key).await
        }

        async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
            sleep(self.delay).await;
            self.inner.set_item(key, value).await
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://cdn.example.com/{id}.png"),
            price: Decimal::new(1050, 2),
        }
    }

    async fn persisted(storage: &MemoryStorage) -> TestResult<Cart> {
        let stored = storage
            .get_item(DEFAULT_STORAGE_KEY)
            .await?
            .ok_or("nothing persisted")?;

        Ok(snapshot::decode(&stored)?)
    }

    #[tokio::test]
    async fn load_without_snapshot_starts_empty() -> TestResult {
        let store = CartStore::load(Arc::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY).await?;

        assert!(store.entries().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn load_restores_snapshot() -> TestResult {
        let storage = MemoryStorage::with_items([(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"a","title":"A","image_url":"","price":2.5,"quantity":3}]"#,
        )]);

        let store = CartStore::load(Arc::new(storage), DEFAULT_STORAGE_KEY).await?;

        let entry = store.find(&ProductId::new("a")).await.ok_or("missing entry")?;

        assert_eq!(entry.quantity(), 3);
        assert_eq!(store.total_quantity().await, 3);

        Ok(())
    }

    #[tokio::test]
    async fn custom_key_is_used_for_reads_and_writes() -> TestResult {
        let storage = Arc::new(MemoryStorage::with_items([(DEFAULT_STORAGE_KEY, "[{]")]));
        let store = CartStore::load(storage.clone(), "guest:cart").await?;

        assert_eq!(store.key(), "guest:cart");

        store.add(product("a")).await?;

        assert!(storage.get_item("guest:cart").await?.is_some());
        assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY).await?.as_deref(), Some("[{]"));

        Ok(())
    }

    #[tokio::test]
    async fn load_with_corrupt_snapshot_fails() {
        let storage = MemoryStorage::with_items([(DEFAULT_STORAGE_KEY, "[{]")]);

        let result = CartStore::load(Arc::new(storage), DEFAULT_STORAGE_KEY).await;

        assert!(
            matches!(result, Err(CartStoreError::Snapshot(_))),
            "expected Snapshot error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn persisted_snapshot_matches_cart_after_every_mutation() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(storage.clone(), DEFAULT_STORAGE_KEY).await?;

        store.add(product("a")).await?;
        assert_eq!(persisted(&storage).await?, store.cart().await);

        store.add(product("b")).await?;
        store.add(product("a")).await?;
        assert_eq!(persisted(&storage).await?, store.cart().await);

        store.increment(ProductId::new("b")).await?;
        assert_eq!(persisted(&storage).await?, store.cart().await);

        store.decrement(ProductId::new("a")).await?;
        store.decrement(ProductId::new("a")).await?;
        assert_eq!(persisted(&storage).await?, store.cart().await);

        let ids: Vec<String> = store
            .entries()
            .await
            .iter()
            .map(|entry| entry.id().to_string())
            .collect();

        assert_eq!(ids, ["b"]);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_reported_without_writing() -> TestResult {
        let mut storage = MockKeyValueStorage::new();

        storage.expect_get_item().once().return_once(|_| Ok(None));
        storage.expect_set_item().never();

        let store = CartStore::load(Arc::new(storage), DEFAULT_STORAGE_KEY).await?;

        let result = store.increment(ProductId::new("missing")).await;

        assert!(
            matches!(result, Err(CartStoreError::Cart(CartError::NotFound(_)))),
            "expected NotFound, got {result:?}"
        );
        assert!(store.entries().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_cart() -> TestResult {
        let mut storage = MockKeyValueStorage::new();

        storage.expect_get_item().once().return_once(|_| Ok(None));
        storage
            .expect_set_item()
            .once()
            .return_once(|_, _| Err(StorageError::Io(io::Error::other("disk full"))));

        let store = CartStore::load(Arc::new(storage), DEFAULT_STORAGE_KEY).await?;

        let result = store.add(product("a")).await;

        assert!(
            matches!(result, Err(CartStoreError::Storage(StorageError::Io(_)))),
            "expected Storage error, got {result:?}"
        );
        assert!(store.entries().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn abandoned_add_still_lands_in_memory_and_storage() -> TestResult {
        let storage = Arc::new(SlowStorage {
            inner: MemoryStorage::new(),
            delay: Duration::from_millis(50),
        });
        let store = CartStore::load(storage.clone(), DEFAULT_STORAGE_KEY).await?;

        let abandoned = timeout(Duration::from_millis(5), store.add(product("a"))).await;

        assert!(abandoned.is_err(), "add finished before the timeout");

        store.add(product("a")).await?;

        let cart = store.cart().await;

        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(persisted(&storage.inner).await?, cart);

        Ok(())
    }

    #[tokio::test]
    async fn precise_prices_persist_unchanged() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::load(storage.clone(), DEFAULT_STORAGE_KEY).await?;

        store
            .add(Product {
                price: "0.1234567890123456789".parse()?,
                ..product("a")
            })
            .await?;

        assert_eq!(persisted(&storage).await?, store.cart().await);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_are_not_lost() -> TestResult {
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(CartStore::load(storage.clone(), DEFAULT_STORAGE_KEY).await?);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add(product("a")).await })
            })
            .collect();

        for task in tasks {
            task.await??;
        }

        assert_eq!(store.total_quantity().await, 16);
        assert_eq!(persisted(&storage).await?.total_quantity(), 16);

        Ok(())
    }

    #[tokio::test]
    async fn subtotal_reflects_committed_cart() -> TestResult {
        let store = CartStore::load(Arc::new(MemoryStorage::new()), DEFAULT_STORAGE_KEY).await?;

        store.add(product("a")).await?;
        store.add(product("a")).await?;

        assert_eq!(store.subtotal(iso::BRL).await?, Money::from_minor(2100, iso::BRL));

        Ok(())
    }
}
