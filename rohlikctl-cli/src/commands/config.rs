//! Config command - inspect and initialize configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use rohlikctl_engine::{Config, Site};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (password redacted).
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a config file with the given account settings.
    Init {
        /// Login email.
        #[arg(long)]
        email: String,

        /// Shop front: rohlik-cz or knuspr-de.
        #[arg(long, default_value = "rohlik-cz")]
        site: String,

        /// Explicit base URL override.
        #[arg(long)]
        base_url: Option<String>,

        /// Refresh interval in seconds.
        #[arg(long)]
        refresh_interval: Option<u64>,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init {
            email,
            site,
            base_url,
            refresh_interval,
        } => init_config(cli, email, site, base_url.as_deref(), *refresh_interval),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.format {
        OutputFormat::Text => {
            println!("rohlikctl Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Site:             {:?}", config.site);
            println!("Base URL:         {}", config.resolved_base_url()?);
            println!(
                "Email:            {}",
                if config.email.is_empty() {
                    "(not set)"
                } else {
                    &config.email
                }
            );
            println!(
                "Password:         {}",
                if config.password.is_some() {
                    "(set in config file)"
                } else {
                    "(from environment)"
                }
            );
            println!("Refresh interval: {}s", config.refresh_interval_secs);
            println!("Request timeout:  {}s", config.request_timeout_secs);
            println!("Retry attempts:   {}", config.retry_attempts);
        }
        OutputFormat::Json => {
            let redacted = serde_json::json!({
                "site": config.site,
                "baseUrl": config.resolved_base_url()?,
                "email": config.email,
                "passwordInConfig": config.password.is_some(),
                "refreshIntervalSecs": config.refresh_interval_secs,
                "requestTimeoutSecs": config.request_timeout_secs,
                "retryAttempts": config.retry_attempts,
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&redacted)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = config_path(cli);

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({ "configFile": path.display().to_string() });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

fn init_config(
    cli: &Cli,
    email: &str,
    site: &str,
    base_url: Option<&str>,
    refresh_interval: Option<u64>,
) -> Result<()> {
    let site = parse_site(site)?;

    let mut config = Config {
        site,
        email: email.to_string(),
        base_url: base_url.map(str::to_string),
        ..Config::default()
    };
    if let Some(secs) = refresh_interval {
        config.refresh_interval_secs = secs;
    }

    // Catch a bad base URL now rather than on first use.
    config.resolved_base_url()?;

    let path = config_path(cli);
    config.save_to(&path)?;

    if !cli.quiet {
        println!("Wrote {}", path.display());
        println!("Set the account password via the ROHLIKCTL_PASSWORD environment variable.");
    }

    Ok(())
}

fn parse_site(name: &str) -> Result<Site> {
    match name {
        "rohlik-cz" => Ok(Site::RohlikCz),
        "knuspr-de" => Ok(Site::KnusprDe),
        other => anyhow::bail!("Unknown site: {other} (expected rohlik-cz or knuspr-de)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_site_accepts_known_sites() {
        assert_eq!(parse_site("rohlik-cz").unwrap(), Site::RohlikCz);
        assert_eq!(parse_site("knuspr-de").unwrap(), Site::KnusprDe);
    }

    #[test]
    fn parse_site_rejects_unknown() {
        assert!(parse_site("rohlik-at").is_err());
    }
}
