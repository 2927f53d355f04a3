//! Product and cart item types shared by the catalog feed crates.
//!
//! - **Ids**: `ProductId` and `SessionId` newtypes
//! - **Product**: an immutable search result as received from the provider
//! - **CartItem**: the same shape, held by the cart
//! - **millis**: serde helper for durations stored as milliseconds

pub mod ids;
pub mod millis;
pub mod product;

pub use ids::{ProductId, SessionId};
pub use product::{CartItem, Product};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::ids::{ProductId, SessionId};
    pub use crate::product::{CartItem, Product};
}
