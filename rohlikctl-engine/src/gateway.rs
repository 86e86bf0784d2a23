//! The action gateway: validated, logged entry point for user-initiated
//! operations.
//!
//! Reads that polling covers (cart, account, delivery) come out of the
//! coordinator's snapshot; everything on-demand goes through here. The
//! gateway validates inputs before any network traffic and logs each
//! action at `info` level.

use tracing::{info, instrument};

use rohlikctl_client::RohlikApi;
use rohlikctl_core::{CartOperationResult, CartSummary, ProductMatch, ShoppingList};

use crate::error::GatewayError;

/// How many candidates a search-and-add looks at before picking the top
/// match.
pub const QUICK_ADD_SEARCH_LIMIT: usize = 5;

// ============================================================================
// Action Gateway
// ============================================================================

/// Dispatches user-initiated actions through the API client.
#[derive(Debug)]
pub struct ActionGateway {
    api: RohlikApi,
}

impl ActionGateway {
    /// Creates a gateway over the given API client.
    pub fn new(api: RohlikApi) -> Self {
        Self { api }
    }

    /// Adds `quantity` units of a product to the cart.
    ///
    /// Every call adds more units; this is not idempotent.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> Result<CartOperationResult, GatewayError> {
        if quantity == 0 {
            return Err(GatewayError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let result = self.api.add_to_cart(product_id, quantity).await?;
        info!(
            product_id,
            quantity,
            cart_items = result.cart.total_items,
            "Added product to cart"
        );
        Ok(result)
    }

    /// Searches the catalog, relevance-ranked, sponsored results removed.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        favourites_only: bool,
    ) -> Result<Vec<ProductMatch>, GatewayError> {
        let query = normalized_query(query)?;
        let matches = self.api.search_products(query, limit, favourites_only).await?;
        info!(query, count = matches.len(), "Catalog search complete");
        Ok(matches)
    }

    /// Searches the catalog and adds the top match to the cart.
    ///
    /// No network write happens unless the search produced at least one
    /// candidate; an empty result is [`GatewayError::NoMatch`].
    #[instrument(skip(self))]
    pub async fn search_and_add(
        &self,
        query: &str,
        quantity: u32,
        favourites_only: bool,
    ) -> Result<CartOperationResult, GatewayError> {
        if quantity == 0 {
            return Err(GatewayError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        let query = normalized_query(query)?;

        let matches = self
            .api
            .search_products(query, QUICK_ADD_SEARCH_LIMIT, favourites_only)
            .await?;
        let Some(top) = matches.first() else {
            return Err(GatewayError::NoMatch {
                query: query.to_string(),
            });
        };

        info!(query, product_id = top.id, name = %top.name, "Quick-add picked top match");
        let result = self.api.add_to_cart(top.id, quantity).await?;
        Ok(result)
    }

    /// Removes a cart line and returns the resulting cart state.
    #[instrument(skip(self))]
    pub async fn delete_from_cart(&self, cart_item_id: &str) -> Result<CartSummary, GatewayError> {
        if cart_item_id.trim().is_empty() {
            return Err(GatewayError::Validation(
                "cart item id must not be blank".to_string(),
            ));
        }
        let cart = self.api.delete_from_cart(cart_item_id).await?;
        info!(cart_item_id, cart_items = cart.total_items, "Removed cart line");
        Ok(cart)
    }

    /// Fetches the cart on demand, bypassing the snapshot.
    pub async fn fetch_cart(&self) -> Result<CartSummary, GatewayError> {
        Ok(self.api.fetch_cart().await?)
    }

    /// Fetches a saved shopping list by id.
    #[instrument(skip(self))]
    pub async fn fetch_shopping_list(&self, list_id: &str) -> Result<ShoppingList, GatewayError> {
        if list_id.trim().is_empty() {
            return Err(GatewayError::Validation(
                "shopping list id must not be blank".to_string(),
            ));
        }
        Ok(self.api.fetch_shopping_list(list_id).await?)
    }

    /// The underlying API client.
    pub fn api(&self) -> &RohlikApi {
        &self.api
    }
}

/// Rejects blank queries before they reach the network.
fn normalized_query(query: &str) -> Result<&str, GatewayError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Validation(
            "search query must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

// ============================================================================
// Tests
// ============================================================================
