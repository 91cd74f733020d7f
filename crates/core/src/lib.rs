//! Marketplace
//!
//! Shopping-cart state for the marketplace client: a pure cart transition
//! function, a store that mirrors every committed change into key-value
//! storage, and the scope through which view code reaches the cart.

pub mod cart;
pub mod context;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod snapshot;
pub mod storage;
pub mod store;
