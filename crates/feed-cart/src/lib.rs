//! Cart state machine.
//!
//! Cart membership is a set of products keyed by id, mutated only through
//! [`reduce`]. Every transition except closing the notification overwrites
//! the single notification slot. [`CartManager`] wraps the reducer with the
//! payload guard used by drag-and-drop and click handlers.

mod error;
mod manager;
mod notification;
mod reducer;

pub use error::CartError;
pub use manager::CartManager;
pub use notification::{Notification, Severity};
pub use reducer::{reduce, CartAction, CartState};
