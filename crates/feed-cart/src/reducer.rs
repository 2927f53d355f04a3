//! Pure cart reducer.

use feed_model::{CartItem, ProductId};
use serde::{Deserialize, Serialize};

use crate::{Notification, Severity};

/// Message for a duplicate add.
pub const ALREADY_IN_CART: &str = "This product is already in the cart";
/// Message for a removal.
pub const REMOVED: &str = "Product removed from cart";
/// Message for clearing the cart.
pub const CLEARED: &str = "Cart cleared";

/// Cart items plus the notification slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartState {
    /// Items in insertion order. No id appears twice.
    pub items: Vec<CartItem>,
    pub notification: Notification,
}

impl CartState {
    /// Check if an item with `id` is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }
}

/// A cart transition.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add an item unless its id is already present.
    Add(CartItem),
    /// Remove the item with this id.
    Remove(ProductId),
    /// Empty the cart.
    Clear,
    /// Close the notification.
    CloseNotification,
}

/// Apply `action` to `state`.
///
/// Total: every action yields a new state, none can fail.
pub fn reduce(state: CartState, action: CartAction) -> CartState {
    let CartState {
        mut items,
        notification,
    } = state;

    match action {
        CartAction::Add(item) => {
            if items.iter().any(|existing| existing.id == item.id) {
                return CartState {
                    items,
                    notification: Notification::show(ALREADY_IN_CART, Severity::Warning),
                };
            }
            let message = format!("{} added to cart", item.name);
            items.push(item);
            CartState {
                items,
                notification: Notification::show(message, Severity::Success),
            }
        }
        CartAction::Remove(id) => {
            items.retain(|item| item.id != id);
            CartState {
                items,
                notification: Notification::show(REMOVED, Severity::Info),
            }
        }
        CartAction::Clear => CartState {
            items: Vec::new(),
            notification: Notification::show(CLEARED, Severity::Info),
        },
        CartAction::CloseNotification => CartState {
            items,
            notification: notification.closed(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use feed_model::Product;

    use super::*;

    fn product(id: &str) -> Product {
        Product::new(id, format!("Product {id}"))
    }

    #[test]
    fn test_add() {
        let state = reduce(CartState::default(), CartAction::Add(product("p1")));
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.notification.message, "Product p1 added to cart");
        assert_eq!(state.notification.severity, Severity::Success);
        assert!(state.notification.open);
    }

    #[test]
    fn test_duplicate_add_warns_and_keeps_items() {
        let state = reduce(CartState::default(), CartAction::Add(product("p1")));
        let state = reduce(state, CartAction::Add(product("p1")));

        assert_eq!(state.items, vec![product("p1")]);
        assert_eq!(state.notification.severity, Severity::Warning);
        assert_eq!(state.notification.message, ALREADY_IN_CART);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut state = CartState::default();
        for id in ["a", "b", "c"] {
            state = reduce(state, CartAction::Add(product(id)));
        }

        state = reduce(state, CartAction::Remove(ProductId::new("b")));
        let ids: Vec<_> = state.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(state.notification.message, REMOVED);

        state = reduce(state, CartAction::Clear);
        assert!(state.items.is_empty());
        assert_eq!(state.notification.message, CLEARED);
        assert_eq!(state.notification.severity, Severity::Info);
    }

    #[test]
    fn test_remove_missing_id_still_notifies() {
        let state = reduce(CartState::default(), CartAction::Remove(ProductId::new("x")));
        assert!(state.items.is_empty());
        assert_eq!(state.notification.severity, Severity::Info);
    }

    #[test]
    fn test_close_notification() {
        let state = reduce(CartState::default(), CartAction::Add(product("p1")));
        let state = reduce(state, CartAction::CloseNotification);

        assert!(!state.notification.open);
        assert_eq!(state.notification.message, "Product p1 added to cart");
        assert_eq!(state.items.len(), 1);
    }

    #[test]
    fn test_newer_notification_overwrites_unread_one() {
        let state = reduce(CartState::default(), CartAction::Add(product("p1")));
        let state = reduce(state, CartAction::Clear);
        assert!(state.notification.open);
        assert_eq!(state.notification.message, CLEARED);
    }

    #[test]
    fn test_no_duplicates_across_action_sequences() {
        // Deterministic pseudo-random walk over a small id space.
        let ids = ["a", "b", "c", "d"];
        let mut seed: u32 = 7;
        let mut state = CartState::default();

        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = ids[(seed >> 8) as usize % ids.len()];
            let action = match (seed >> 16) % 7 {
                0..=3 => CartAction::Add(product(id)),
                4 | 5 => CartAction::Remove(ProductId::new(id)),
                _ => CartAction::Clear,
            };
            state = reduce(state, action);

            let unique: HashSet<_> = state.items.iter().map(|p| &p.id).collect();
            assert_eq!(unique.len(), state.items.len());
        }
    }
}
