//! Cart Snapshots
//!
//! A snapshot is the whole cart serialized as a JSON array of entries:
//!
//! ```json
//! [{"id":"1","title":"Mug","image_url":"https://…/mug.png","price":12.5,"quantity":2}]
//! ```

use thiserror::Error;

use crate::cart::{Cart, CartEntry, CartError};

/// Errors related to encoding or decoding snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The payload is not a valid list of cart entries.
    #[error("malformed cart snapshot")]
    Malformed(#[source] serde_json::Error),

    /// The entries decoded but do not form a valid cart.
    #[error("invalid cart snapshot")]
    Invalid(#[source] CartError),
}

/// Serialize a cart to its snapshot form.
///
/// # Errors
///
/// Returns [`SnapshotError::Malformed`] if serialization fails.
pub fn encode(cart: &Cart) -> Result<String, SnapshotError> {
    serde_json::to_string(cart.entries()).map_err(SnapshotError::Malformed)
}

/// Parse a snapshot back into a cart.
///
/// # Errors
///
/// - [`SnapshotError::Malformed`]: the payload is not JSON, or an entry is
///   missing a field or has a zero quantity.
/// - [`SnapshotError::Invalid`]: two entries share an identifier.
pub fn decode(snapshot: &str) -> Result<Cart, SnapshotError> {
    let entries: Vec<CartEntry> =
        serde_json::from_str(snapshot).map_err(SnapshotError::Malformed)?;

    Cart::from_entries(entries).map_err(SnapshotError::Invalid)
}
