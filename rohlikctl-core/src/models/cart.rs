//! Cart contents and cart operation results.

use serde::{Deserialize, Serialize};

/// A single line item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id.
    pub product_id: String,
    /// Cart line id, needed to delete the item again.
    pub cart_item_id: String,
    /// Product name.
    pub name: String,
    /// Quantity in the cart.
    pub quantity: u32,
    /// Price for this line.
    pub price: f64,
    /// Brand, if known.
    pub brand: Option<String>,
}

/// Summary of the current cart state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Total price of the cart.
    pub total_price: f64,
    /// Number of distinct items in the cart.
    pub total_items: u32,
    /// Whether the cart currently satisfies the order minimum.
    pub can_make_order: bool,
    /// Line items.
    pub items: Vec<CartItem>,
}

impl CartSummary {
    /// An empty cart.
    pub fn empty() -> Self {
        Self {
            total_price: 0.0,
            total_items: 0,
            can_make_order: false,
            items: Vec::new(),
        }
    }

    /// Returns the quantity of a given product in the cart, 0 if absent.
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .sum()
    }
}

/// Outcome of an add-to-cart action.
///
/// Echoes the cart state observed immediately after the add so the caller
/// has a synchronous confirmation; the coordinator's next scheduled cycle
/// picks the change up for everyone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartOperationResult {
    /// Product that was added.
    pub product_id: i64,
    /// Quantity that was added.
    pub quantity: u32,
    /// Cart summary after the operation.
    pub cart: CartSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cart_cannot_order() {
        let cart = CartSummary::empty();
        assert_eq!(cart.total_items, 0);
        assert!(!cart.can_make_order);
    }

    #[test]
    fn quantity_of_sums_matching_lines() {
        let cart = CartSummary {
            total_price: 59.8,
            total_items: 2,
            can_make_order: false,
            items: vec![
                CartItem {
                    product_id: "42".to_string(),
                    cart_item_id: "c1".to_string(),
                    name: "Mléko".to_string(),
                    quantity: 2,
                    price: 39.8,
                    brand: None,
                },
                CartItem {
                    product_id: "7".to_string(),
                    cart_item_id: "c2".to_string(),
                    name: "Rohlík".to_string(),
                    quantity: 10,
                    price: 20.0,
                    brand: None,
                },
            ],
        };

        assert_eq!(cart.quantity_of("42"), 2);
        assert_eq!(cart.quantity_of("7"), 10);
        assert_eq!(cart.quantity_of("999"), 0);
    }
}
