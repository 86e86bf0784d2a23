//! Status command - run one refresh cycle and display the snapshot.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use rohlikctl_engine::{Coordinator, build_api};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat, load_config};

/// Arguments for the status command.
#[derive(Args, Default)]
pub struct StatusArgs {
    /// Exit non-zero when any sub-fetch failed (partial snapshot).
    #[arg(long)]
    pub strict: bool,
}

/// Runs the status command.
pub async fn run(args: &StatusArgs, cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let api = build_api(&config)?;
    let coordinator = Coordinator::new(api, config.refresh_interval());

    coordinator.refresh_now().await;
    let snapshot = coordinator.snapshot();

    if snapshot.needs_reconfiguration {
        warn!("Repeated authentication failures; check credentials");
    }

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&*snapshot)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_snapshot(&snapshot));
        }
    }

    if !snapshot.has_data() {
        anyhow::bail!("no data could be fetched; check connectivity and credentials");
    }
    if args.strict && snapshot.partial {
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
