//! Key-Value Storage
//!
//! The persistence seam the cart store writes snapshots through. Values are
//! opaque strings stored under string keys, like the key-value store a
//! mobile device offers.

use std::io;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage i/o failed")]
    Io(#[from] io::Error),

    /// The backing file exists but is not a valid key-value manifest.
    #[error("storage manifest is corrupt")]
    Manifest(#[source] serde_json::Error),
}

/// Asynchronous string key-value storage.
#[automock]
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
}
