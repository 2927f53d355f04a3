//! JSON pointers into the provider's search response.
//!
//! ```text
//! item.props.pageProps.initialData
//!     .searchResult.itemStacks[0].items   primary item list
//!     .searchResult.count                 total result count
//!     .contentLayout.modules              fallback item list
//! ```

/// Primary item list.
pub const PRIMARY_ITEMS: &str = "/item/props/pageProps/initialData/searchResult/itemStacks/0/items";

/// Fallback item list, tried when the primary list is missing or empty.
pub const FALLBACK_ITEMS: &str = "/item/props/pageProps/initialData/contentLayout/modules";

/// Provider-reported total result count.
pub const TOTAL_COUNT: &str = "/item/props/pageProps/initialData/searchResult/count";

/// Build a response carrying `items` on the primary path.
pub fn primary_response(items: Vec<serde_json::Value>, count: u64) -> serde_json::Value {
    serde_json::json!({
        "item": { "props": { "pageProps": { "initialData": {
            "searchResult": {
                "count": count,
                "itemStacks": [ { "items": items } ]
            }
        }}}}
    })
}

/// Build a response carrying `items` on the fallback path only.
pub fn fallback_response(items: Vec<serde_json::Value>, count: u64) -> serde_json::Value {
    serde_json::json!({
        "item": { "props": { "pageProps": { "initialData": {
            "searchResult": { "count": count, "itemStacks": [] },
            "contentLayout": { "modules": items }
        }}}}
    })
}
