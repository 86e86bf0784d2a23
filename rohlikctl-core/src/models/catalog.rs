//! Product search results and shopping lists.

use serde::{Deserialize, Serialize};

/// A single product search result.
///
/// Results arrive relevance-ranked from the upstream search endpoint and
/// that order is preserved; the first element is the top match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    /// Product id, usable with add-to-cart.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Full price.
    pub price: f64,
    /// Price currency (e.g. "CZK", "EUR").
    pub currency: String,
    /// Brand, if known.
    pub brand: Option<String>,
    /// Textual amount (e.g. "500 g").
    pub amount: Option<String>,
    /// Whether the product is marked as a favourite by this account.
    pub favourite: bool,
}

/// A saved shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    /// List id.
    pub id: String,
    /// List name.
    pub name: String,
    /// Items saved on the list.
    pub items: Vec<ShoppingListItem>,
}

/// A single item on a shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Product id.
    pub product_id: i64,
    /// Product name.
    pub name: String,
    /// Saved quantity.
    pub quantity: u32,
}
