//! Reading products out of a provider response.
//!
//! The primary item path is tried first; if it is missing or empty the
//! fallback path is tried before the page is declared empty. A response in
//! which neither path is an array is malformed.

use std::collections::BTreeMap;

use feed_data::shape;
use feed_model::{Product, ProductId};
use serde_json::Value;

use crate::FetchError;

/// Which path the items were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    /// `searchResult.itemStacks[0].items`
    Primary,
    /// `contentLayout.modules`
    Fallback,
    /// Both paths were present but empty.
    None,
}

/// Products read from one response.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    /// Parsed products, in provider order. Entries without an id are dropped.
    pub products: Vec<Product>,
    /// Provider-reported total count. `None` when missing or zero.
    pub total: Option<u64>,
    /// Where the items came from.
    pub source: ItemSource,
}

impl ExtractedPage {
    /// Check if the page carried no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Extract products and total count from a search response.
pub fn extract_page(response: &Value) -> Result<ExtractedPage, FetchError> {
    let primary = response.pointer(shape::PRIMARY_ITEMS).and_then(Value::as_array);
    let fallback = response.pointer(shape::FALLBACK_ITEMS).and_then(Value::as_array);

    let (raw, source) = match (primary, fallback) {
        (Some(items), _) if !items.is_empty() => (items.as_slice(), ItemSource::Primary),
        (_, Some(items)) if !items.is_empty() => (items.as_slice(), ItemSource::Fallback),
        (None, None) => {
            return Err(FetchError::MalformedResponse(
                "no item list at primary or fallback path".to_string(),
            ))
        }
        _ => (&[][..], ItemSource::None),
    };

    let total = response
        .pointer(shape::TOTAL_COUNT)
        .and_then(as_u64_lenient)
        .filter(|count| *count > 0);

    let products: Vec<Product> = raw.iter().filter_map(parse_product).collect();
    if products.len() < raw.len() {
        tracing::debug!(
            skipped = raw.len() - products.len(),
            "skipped entries without an id"
        );
    }

    Ok(ExtractedPage {
        products,
        total,
        source,
    })
}

/// Map one raw item to a product. Returns `None` when it has no identity.
pub fn parse_product(item: &Value) -> Option<Product> {
    let obj = item.as_object()?;

    let id = obj
        .get("id")
        .or_else(|| obj.get("usItemId"))
        .and_then(as_string_lenient)
        .filter(|id| !id.trim().is_empty())?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let price = obj
        .get("price")
        .or_else(|| item.pointer("/priceInfo/currentPrice/price"))
        .and_then(parse_price);

    let image = string_field(obj.get("image"))
        .or_else(|| string_field(item.pointer("/imageInfo/thumbnailUrl")));

    let description =
        string_field(obj.get("description")).or_else(|| string_field(obj.get("shortDescription")));

    let attributes = obj.get("attributes").and_then(Value::as_object).map(|map| {
        map.iter()
            .filter_map(|(k, v)| as_string_lenient(v).map(|v| (k.clone(), v)))
            .collect::<BTreeMap<_, _>>()
    });

    Some(Product {
        id: ProductId::new(id),
        name,
        price,
        image,
        thumbnail_image: string_field(obj.get("thumbnailImage")),
        description,
        sku: obj.get("sku").and_then(as_string_lenient),
        stock: obj
            .get("stock")
            .and_then(as_u64_lenient)
            .map(|s| s.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        attributes,
    })
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn as_string_lenient(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse()
            .ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_path() {
        let response = shape::primary_response(
            vec![json!({"id": "a", "name": "A", "price": 10.5}), json!({"id": "b", "name": "B"})],
            45,
        );
        let page = extract_page(&response).unwrap();
        assert_eq!(page.source, ItemSource::Primary);
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total, Some(45));
        assert_eq!(page.products[0].price, Some(10.5));
    }

    #[test]
    fn test_fallback_path_when_primary_missing() {
        let response = shape::fallback_response(vec![json!({"usItemId": 991, "name": "Module"})], 1);
        let page = extract_page(&response).unwrap();
        assert_eq!(page.source, ItemSource::Fallback);
        assert_eq!(page.products[0].id.as_str(), "991");
    }

    #[test]
    fn test_fallback_path_when_primary_empty() {
        let response = json!({
            "item": { "props": { "pageProps": { "initialData": {
                "searchResult": { "count": 3, "itemStacks": [ { "items": [] } ] },
                "contentLayout": { "modules": [ { "id": "m1" } ] }
            }}}}
        });
        let page = extract_page(&response).unwrap();
        assert_eq!(page.source, ItemSource::Fallback);
        assert_eq!(page.products.len(), 1);
    }

    #[test]
    fn test_both_paths_empty_is_empty_page() {
        let page = extract_page(&shape::primary_response(vec![], 0)).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.source, ItemSource::None);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_unexpected_shape_is_malformed() {
        let err = extract_page(&json!({"data": []})).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));

        let err = extract_page(&json!("not even an object")).unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[test]
    fn test_lenient_product_fields() {
        let product = parse_product(&json!({
            "usItemId": "123",
            "name": "Boot",
            "price": "$1,024.50",
            "imageInfo": { "thumbnailUrl": "https://img/boot.jpg" },
            "shortDescription": "Warm",
            "stock": "4",
            "attributes": { "size": 42, "color": "brown", "nested": {} }
        }))
        .unwrap();

        assert_eq!(product.id.as_str(), "123");
        assert_eq!(product.price, Some(1024.5));
        assert_eq!(product.image.as_deref(), Some("https://img/boot.jpg"));
        assert_eq!(product.description.as_deref(), Some("Warm"));
        assert_eq!(product.stock, 4);
        let attributes = product.attributes.unwrap();
        assert_eq!(attributes["size"], "42");
        assert!(!attributes.contains_key("nested"));
    }

    #[test]
    fn test_items_without_id_are_skipped() {
        assert!(parse_product(&json!({"name": "ghost"})).is_none());
        assert!(parse_product(&json!({"id": "  "})).is_none());
        assert!(parse_product(&json!(42)).is_none());
    }
}
