//! Cart command - show the cart or remove lines from it.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::commands::build_gateway;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub action: Option<CartAction>,
}

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartAction {
    /// Show the current cart contents (default).
    Show,

    /// Remove a cart line by its cart line id.
    Remove {
        /// Cart line id, as shown by `rohlikctl cart`.
        cart_item_id: String,
    },
}

/// Runs the cart command.
pub async fn run(args: &CartArgs, cli: &Cli) -> Result<()> {
    let gateway = build_gateway(cli)?;

    let cart = match args.action.as_ref().unwrap_or(&CartAction::Show) {
        CartAction::Show => gateway.fetch_cart().await?,
        CartAction::Remove { cart_item_id } => {
            let cart = gateway.delete_from_cart(cart_item_id).await?;
            if cli.format == OutputFormat::Text && !cli.quiet {
                println!("Removed cart line {cart_item_id}");
                println!();
            }
            cart
        }
    };

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&cart)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_cart(&cart));
        }
    }

    Ok(())
}
