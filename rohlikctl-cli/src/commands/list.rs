//! List command - show a saved shopping list.

use anyhow::Result;
use clap::Args;

use crate::commands::build_gateway;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Shopping list id.
    pub list_id: String,
}

/// Runs the list command.
pub async fn run(args: &ListArgs, cli: &Cli) -> Result<()> {
    let gateway = build_gateway(cli)?;
    let list = gateway.fetch_shopping_list(&args.list_id).await?;

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&list)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_list(&list));
        }
    }

    Ok(())
}
