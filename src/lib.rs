//! Cartwheel
//!
//! Cartwheel is the shopping cart core of a storefront: a cart whose totals are always derived
//! from its lines, a snapshot that survives restarts, and an inactivity session that warns
//! before it clears the cart.

pub mod cart;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod expiry;
pub mod ids;
pub mod money;
pub mod observer;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod snapshot;
pub mod storage;
pub mod store;
