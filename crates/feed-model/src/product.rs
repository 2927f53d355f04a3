//! Product and cart item types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// A product returned by the search provider.
///
/// Immutable once received. The fetch coordinator owns the accumulated list
/// for the lifetime of the current search term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identity, unique within a search session.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in the provider's currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Full-size image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Thumbnail image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_image: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stock keeping unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Extra attributes (colour, size, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
}

/// A cart line item has exactly the shape of a product.
pub type CartItem = Product;

impl Product {
    /// Create a product with only identity and name set.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: None,
            image: None,
            thumbnail_image: None,
            description: None,
            sku: None,
            stock: 0,
            attributes: None,
        }
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the full-size image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    /// Set the thumbnail URL.
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_image = Some(url.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Check if the product can be added to a cart by the UI.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// URL to show in a grid: the thumbnail if present, else the full image.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_image.as_deref().or(self.image.as_deref())
    }

    /// Format the price as a dollar string, or "N/A" when unknown.
    pub fn price_display(&self) -> String {
        match self.price {
            Some(price) => format!("${:.2}", price),
            None => "N/A".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_builder() {
        let product = Product::new("p1", "Running Shoe")
            .with_price(59.5)
            .with_image("https://img.example/p1.jpg")
            .with_stock(3)
            .with_attribute("color", "red");

        assert_eq!(product.id.as_str(), "p1");
        assert!(product.is_in_stock());
        assert_eq!(product.price_display(), "$59.50");
        assert_eq!(product.attributes.unwrap()["color"], "red");
    }

    #[test]
    fn test_thumbnail_falls_back_to_image() {
        let product = Product::new("p1", "Shoe").with_image("full.jpg");
        assert_eq!(product.thumbnail_url(), Some("full.jpg"));

        let product = product.with_thumbnail("thumb.jpg");
        assert_eq!(product.thumbnail_url(), Some("thumb.jpg"));
    }

    #[test]
    fn test_missing_price_display() {
        assert_eq!(Product::new("p1", "Shoe").price_display(), "N/A");
        assert!(!Product::new("p1", "Shoe").is_in_stock());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let product = Product::new("p1", "Shoe").with_thumbnail("t.jpg");
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["thumbnailImage"], "t.jpg");

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, product);
    }
}
