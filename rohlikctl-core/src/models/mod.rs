//! Domain models for rohlikctl.
//!
//! ## Submodules
//!
//! - [`account`] - Account and premium membership types
//! - [`delivery`] - Delivery slot and announcement types
//! - [`cart`] - Cart contents and cart operation results
//! - [`catalog`] - Product search results and shopping lists
//! - [`snapshot`] - The polled aggregate published by the coordinator

mod account;
mod cart;
mod catalog;
mod delivery;
mod snapshot;

// Re-export everything at the models level
pub use account::{AccountInfo, PremiumStatus};
pub use cart::{CartItem, CartOperationResult, CartSummary};
pub use catalog::{ProductMatch, ShoppingList, ShoppingListItem};
pub use delivery::{DeliveryInfo, DeliverySlot};
pub use snapshot::{Polled, Snapshot};
