// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # rohlikctl Client
//!
//! Authenticated client for the reverse-engineered Rohlik.cz / Knuspr.de
//! API.
//!
//! ## Modules
//!
//! - [`session`] - Credential and session lifecycle ([`SessionManager`])
//! - [`api`] - Typed request methods, one per upstream operation
//!   ([`RohlikApi`])
//! - [`http`] - Transport with timeout and bounded retry ([`HttpClient`])
//! - [`wire`] - Upstream payload shapes, isolated from the rest of the
//!   workspace
//! - [`error`] - The [`ApiError`] taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rohlikctl_client::{Credentials, HttpClient, RohlikApi, SessionManager};
//!
//! let sessions = Arc::new(SessionManager::new(
//!     Credentials::new("user@example.com", "password"),
//!     "https://www.rohlik.cz",
//!     HttpClient::new()?,
//! ));
//! let api = RohlikApi::new(sessions);
//! let cart = api.fetch_cart().await?;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod session;
pub mod wire;

pub use api::RohlikApi;
pub use error::ApiError;
pub use http::{HttpClient, RetryPolicy};
pub use session::{Credentials, Session, SessionManager};
