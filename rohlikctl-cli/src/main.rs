// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! rohlikctl CLI - grocery account, cart and delivery from the command line.
//!
//! # Examples
//!
//! ```bash
//! # One-shot status (account, premium, delivery, cart)
//! rohlikctl
//!
//! # Keep refreshing like htop
//! rohlikctl watch --interval 300
//!
//! # Show the cart
//! rohlikctl cart
//!
//! # Search the catalog
//! rohlikctl search "mleko"
//!
//! # Add a product by id
//! rohlikctl add 1409 --quantity 2
//!
//! # Search and add the top match in one step
//! rohlikctl quick-add "rohlik staroceský"
//!
//! # JSON output
//! rohlikctl --format json --pretty
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rohlikctl_client::ApiError;
use rohlikctl_engine::{Config, EngineError, GatewayError};

use commands::{add, cart, config, list, search, status, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// rohlikctl CLI - grocery delivery account control.
#[derive(Parser)]
#[command(name = "rohlikctl")]
#[command(about = "Grocery delivery account, cart and delivery CLI")]
#[command(long_about = r#"
rohlikctl talks to a Rohlik-group grocery delivery account.

Supported sites:
  • Rohlik.cz (rohlik-cz)
  • Knuspr.de (knuspr-de)

Credentials come from the config file (rohlikctl config init) with the
password preferably supplied via the ROHLIKCTL_PASSWORD environment
variable.

Examples:
  rohlikctl                      # One-shot status snapshot
  rohlikctl watch                # Periodic refresh display
  rohlikctl cart                 # Show the cart
  rohlikctl search "mleko"       # Search the catalog
  rohlikctl quick-add "rohlik"   # Add the top search match
  rohlikctl --format json        # JSON output
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'status' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Path to the config file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a full status snapshot (default if no command specified).
    #[command(visible_alias = "st")]
    Status(status::StatusArgs),

    /// Watch mode: keep refreshing and redrawing the snapshot.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Show or modify the shopping cart.
    Cart(cart::CartArgs),

    /// Search the product catalog.
    #[command(visible_alias = "se")]
    Search(search::SearchArgs),

    /// Add a product to the cart by product id.
    Add(add::AddArgs),

    /// Search the catalog and add the top match to the cart.
    #[command(visible_alias = "qa")]
    QuickAdd(add::QuickAddArgs),

    /// Show a saved shopping list.
    List(list::ListArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Configuration missing or invalid.
    ConfigMissing = 2,
    /// Authentication rejected by the service.
    AuthFailure = 3,
    /// A search-and-add found no product to act on.
    NoMatch = 4,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("rohlikctl=debug,info")
    } else {
        EnvFilter::new("rohlikctl=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Status(args)) => status::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Cart(args)) => cart::run(args, &cli).await,
        Some(Commands::Search(args)) => search::run(args, &cli).await,
        Some(Commands::Add(args)) => add::run(args, &cli).await,
        Some(Commands::QuickAdd(args)) => add::run_quick(args, &cli).await,
        Some(Commands::List(args)) => list::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => {
            // Default to status command
            status::run(&status::StatusArgs::default(), &cli).await
        }
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

/// Maps an error chain to a process exit code.
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(gateway) = cause.downcast_ref::<GatewayError>() {
            return match gateway {
                GatewayError::NoMatch { .. } => ExitCode::NoMatch,
                GatewayError::Api(ApiError::Authentication(_)) => ExitCode::AuthFailure,
                _ => ExitCode::Error,
            };
        }
        if let Some(engine) = cause.downcast_ref::<EngineError>() {
            return match engine {
                EngineError::MissingCredentials(_) | EngineError::InvalidConfig(_) => {
                    ExitCode::ConfigMissing
                }
                _ => ExitCode::Error,
            };
        }
        if let Some(ApiError::Authentication(_)) = cause.downcast_ref::<ApiError>() {
            return ExitCode::AuthFailure;
        }
    }
    ExitCode::Error
}

/// Loads the configuration, honoring a `--config` override.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}
