//! CLI command implementations.

pub mod add;
pub mod cart;
pub mod config;
pub mod list;
pub mod search;
pub mod status;
pub mod watch;

use anyhow::Result;

use rohlikctl_engine::{ActionGateway, build_api};

use crate::{Cli, load_config};

/// Builds an action gateway from the effective configuration.
pub fn build_gateway(cli: &Cli) -> Result<ActionGateway> {
    let config = load_config(cli)?;
    let api = build_api(&config)?;
    Ok(ActionGateway::new(api))
}
