// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # rohlikctl Engine
//!
//! The stateful layer between the API client and any frontend:
//!
//! - [`Config`]: file- and environment-based configuration, including
//!   site selection and credential resolution
//! - [`Coordinator`]: the periodic refresh loop that polls the four read
//!   endpoints concurrently and publishes atomic [`Snapshot`]s
//! - [`ActionGateway`]: validated entry point for user-initiated actions
//!   (cart mutations, search, shopping lists)
//!
//! [`build_api`] wires a configured [`RohlikApi`] from a [`Config`]; the
//! coordinator and gateway each take one, so a frontend can share a
//! single session across both.
//!
//! [`Snapshot`]: rohlikctl_core::Snapshot

use std::sync::Arc;

use rohlikctl_client::{HttpClient, RetryPolicy, RohlikApi, SessionManager};

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;

pub use config::{Config, Site};
pub use coordinator::{Coordinator, DEFAULT_REFRESH_INTERVAL, RefreshState};
pub use error::{EngineError, GatewayError};
pub use gateway::{ActionGateway, QUICK_ADD_SEARCH_LIMIT};

/// Builds a configured API client from a [`Config`].
///
/// Resolves the base URL and credentials, then assembles the HTTP layer
/// with the configured timeout and retry budget. The returned client is
/// cheap to clone and safe to share between a [`Coordinator`] and an
/// [`ActionGateway`].
///
/// # Errors
///
/// Returns [`EngineError::MissingCredentials`] when no password is
/// available, [`EngineError::InvalidConfig`] for an unusable base URL,
/// and [`EngineError::Api`] when the HTTP client cannot be built.
pub fn build_api(config: &Config) -> Result<RohlikApi, EngineError> {
    let credentials = config.credentials()?;
    let base_url = config.resolved_base_url()?;

    let http = HttpClient::with_timeout(config.request_timeout())?
        .with_retry_policy(RetryPolicy::new(config.retry_attempts));
    let sessions = Arc::new(SessionManager::new(credentials, base_url, http));

    Ok(RohlikApi::new(sessions))
}
