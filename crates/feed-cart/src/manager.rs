//! Cart owner used by the presentation layer.

use std::collections::HashSet;

use feed_model::{CartItem, Product, ProductId};

use crate::{reduce, CartAction, CartError, CartState, Notification};

/// Owns the cart state and dispatches transitions.
#[derive(Debug, Clone, Default)]
pub struct CartManager {
    state: CartState,
}

impl CartManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn dispatch(&mut self, action: CartAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Add `item` to the cart.
    ///
    /// An item with a blank id is rejected and logged; nothing is
    /// dispatched and the notification is untouched.
    pub fn add_to_cart(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.id.is_blank() {
            let err = CartError::InvalidPayload(format!("product {:?} has no id", item.name));
            tracing::error!(error = %err, "rejected cart add");
            return Err(err);
        }
        tracing::debug!(id = %item.id, "cart add");
        self.dispatch(CartAction::Add(item));
        Ok(())
    }

    /// Add a product from a serialized drop payload.
    pub fn add_from_json(&mut self, payload: &str) -> Result<(), CartError> {
        let item: Product = serde_json::from_str(payload).map_err(|e| {
            let err = CartError::InvalidPayload(e.to_string());
            tracing::error!(error = %err, "rejected cart drop payload");
            err
        })?;
        self.add_to_cart(item)
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) {
        self.dispatch(CartAction::Remove(id.clone()));
    }

    pub fn clear_cart(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    pub fn close_notification(&mut self) {
        self.dispatch(CartAction::CloseNotification);
    }

    /// Items in the order they were added.
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.state.contains(id)
    }

    /// Ids of every item in the cart.
    pub fn item_ids(&self) -> HashSet<&ProductId> {
        self.state.items.iter().map(|item| &item.id).collect()
    }

    pub fn notification(&self) -> &Notification {
        &self.state.notification
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// `products` minus everything in the cart, order preserved.
    pub fn available<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let in_cart = self.item_ids();
        products
            .iter()
            .filter(|product| !in_cart.contains(&product.id))
            .collect()
    }
}
