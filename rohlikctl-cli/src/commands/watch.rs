//! Watch command - periodic refresh with a redrawn snapshot display.

use std::io::{Write, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use rohlikctl_engine::{Coordinator, build_api};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat, load_config};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Minimum interval to use.
    #[arg(long, default_value = "30")]
    pub min_interval: u64,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let configured = config.refresh_interval().as_secs();
    let refresh_interval = args.interval.unwrap_or(configured).max(args.min_interval);

    info!(interval = refresh_interval, "Starting watch mode");

    let api = build_api(&config)?;
    let coordinator = Arc::new(Coordinator::new(
        api,
        Duration::from_secs(refresh_interval),
    ));
    let mut rx = coordinator.subscribe();

    // The poll loop runs in the background; this task only renders.
    let _runner = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run().await })
    };

    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(false);

    loop {
        rx.changed().await?;
        let snapshot = rx.borrow_and_update().clone();

        match cli.format {
            OutputFormat::Json => {
                // One JSON document per refresh cycle, newline-delimited.
                println!("{}", json.format(&*snapshot)?);
            }
            OutputFormat::Text => {
                // Clear screen
                print!("\x1b[2J\x1b[H");
                stdout().flush()?;

                let now = chrono::Local::now();
                println!(
                    "rohlikctl watch - {} (refresh: {}s)",
                    now.format("%H:%M:%S"),
                    refresh_interval
                );
                println!("{}", "─".repeat(50));
                println!();
                println!("{}", text.format_snapshot(&snapshot));
                println!();
                println!("Press Ctrl+C to exit");
            }
        }
    }
}
