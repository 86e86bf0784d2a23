//! Add commands - put products into the cart, by id or by search.

use anyhow::Result;
use clap::Args;

use rohlikctl_core::CartOperationResult;

use crate::commands::build_gateway;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id to add.
    pub product_id: i64,

    /// How many units to add.
    #[arg(long, short = 'n', default_value = "1")]
    pub quantity: u32,
}

/// Arguments for the quick-add command.
#[derive(Args)]
pub struct QuickAddArgs {
    /// Search query; the top match gets added.
    pub query: String,

    /// How many units to add.
    #[arg(long, short = 'n', default_value = "1")]
    pub quantity: u32,

    /// Only consider products marked as favourites.
    #[arg(long)]
    pub favourites: bool,
}

/// Runs the add command.
pub async fn run(args: &AddArgs, cli: &Cli) -> Result<()> {
    let gateway = build_gateway(cli)?;
    let result = gateway.add_to_cart(args.product_id, args.quantity).await?;
    output_result(&result, cli)
}

/// Runs the quick-add command.
pub async fn run_quick(args: &QuickAddArgs, cli: &Cli) -> Result<()> {
    let gateway = build_gateway(cli)?;
    let result = gateway
        .search_and_add(&args.query, args.quantity, args.favourites)
        .await?;
    output_result(&result, cli)
}

fn output_result(result: &CartOperationResult, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(result)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if !cli.quiet {
                println!(
                    "Added {}x product {}",
                    result.quantity, result.product_id
                );
                println!();
            }
            println!("{}", formatter.format_cart(&result.cart));
        }
    }
    Ok(())
}
