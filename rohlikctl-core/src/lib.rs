// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # rohlikctl Core
//!
//! Core domain models for the rohlikctl workspace.
//!
//! This crate holds the typed representations of everything the grocery
//! API exposes, independent of how it is fetched:
//!
//! - Account data ([`AccountInfo`], [`PremiumStatus`])
//! - Delivery information ([`DeliveryInfo`], [`DeliverySlot`])
//! - Cart state ([`CartSummary`], [`CartItem`], [`CartOperationResult`])
//! - Search and shopping lists ([`ProductMatch`], [`ShoppingList`])
//! - The polled aggregate ([`Snapshot`], [`Polled`])
//!
//! The [`Snapshot`] type is the contract between the data coordinator and
//! its consumers: it is built once per refresh cycle and replaced
//! atomically, never mutated in place.

pub mod models;

// Re-export all model types
pub use models::{
    // Account
    AccountInfo,
    PremiumStatus,
    // Delivery
    DeliveryInfo,
    DeliverySlot,
    // Cart
    CartItem,
    CartOperationResult,
    CartSummary,
    // Search & lists
    ProductMatch,
    ShoppingList,
    ShoppingListItem,
    // Aggregate
    Polled,
    Snapshot,
};
