//! Search command - query the product catalog.

use anyhow::Result;
use clap::Args;

use crate::commands::build_gateway;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search query.
    pub query: String,

    /// Maximum number of results.
    #[arg(long, short, default_value = "10")]
    pub limit: usize,

    /// Only show products marked as favourites.
    #[arg(long)]
    pub favourites: bool,
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<()> {
    let gateway = build_gateway(cli)?;
    let matches = gateway
        .search(&args.query, args.limit, args.favourites)
        .await?;

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&matches)?);
        }
        OutputFormat::Text => {
            if matches.is_empty() {
                println!("No products matched \"{}\"", args.query);
            } else {
                let formatter = TextFormatter::new(!cli.no_color);
                println!("{}", formatter.format_matches(&matches));
            }
        }
    }

    Ok(())
}
