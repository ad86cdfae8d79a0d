//! Locator CLI - one-shot lookups against the configured account
//!
//! Prints the account's device or the address of a shared location and exits.

use anyhow::Context;
use clap::{Parser, Subcommand};
use locator_client::{session_manager_from_config, SessionManager};
use locator_core::{init_logging, LocatorConfig, LocatorResult};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "locator")]
#[command(about = "Last-known location of a device account")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read attempts before giving up on the remote service
    #[arg(short, long, global = true)]
    retries: Option<usize>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the account's primary device
    Device,

    /// Print the address of a shared location as JSON
    Locate {
        /// 1-based index; 0 prints every location
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        index: i64,
    },
}

impl Cli {
    /// Apply the flags that were given on top of the loaded configuration
    fn apply(&self, config: &mut LocatorConfig) -> LocatorResult<()> {
        if let Some(retries) = self.retries {
            config.fetch_retries = retries;
            config.validate()?;
        }
        if let Some(level) = &self.log_level {
            config.logging.set_level(level);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let mut config =
        LocatorConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config)?;

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!("Starting Locator CLI v{}", env!("CARGO_PKG_VERSION"));

    let sessions = session_manager_from_config(&config)?;
    let output = run(&cli.command, &sessions).await?;
    println!("{}", output);

    Ok(())
}

async fn run(command: &Commands, sessions: &SessionManager) -> anyhow::Result<String> {
    match command {
        Commands::Device => {
            let device = sessions.fetch_device().await?;
            Ok(device.map_or_else(|| "None".to_string(), |d| d.to_string()))
        }
        Commands::Locate { index } => {
            let lookup = sessions.fetch_address(*index).await?;
            serde_json::to_string_pretty(&lookup).context("Failed to render address")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locator_core::LogFormat;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["locator", "device"]);
        assert!(matches!(cli.command, Commands::Device));
        assert!(cli.retries.is_none());
        assert!(cli.log_level.is_none());

        let cli = Cli::parse_from(["locator", "locate"]);
        assert!(matches!(cli.command, Commands::Locate { index: 1 }));

        let cli = Cli::parse_from([
            "locator",
            "locate",
            "--index",
            "-1",
            "--retries",
            "5",
            "--config",
            "locator.toml",
            "--log-level",
            "error",
        ]);
        assert!(matches!(cli.command, Commands::Locate { index: -1 }));
        assert_eq!(cli.retries, Some(5));
        assert_eq!(cli.config, Some(PathBuf::from("locator.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("error"));
    }

    fn configured() -> LocatorConfig {
        let mut config: LocatorConfig = toml::from_str(
            r#"
            fetch_retries = 7

            [account]
            email = "me@example.com"
            password = "secret"

            [logging]
            level = "warn"
            format = "json"
            filter_directives = ["locator_client=warn", "hyper=error"]
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        config
    }

    #[test]
    fn test_config_file_settings_survive_without_flags() {
        let mut config = configured();
        Cli::parse_from(["locator", "device"]).apply(&mut config).unwrap();

        assert_eq!(config.fetch_retries, 7);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut config = configured();
        Cli::parse_from(["locator", "device", "--retries", "2", "--log-level", "debug"])
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.fetch_retries, 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.logging.filter_directives,
            ["locator_client=debug", "hyper=error"]
        );
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = configured();
        assert!(Cli::parse_from(["locator", "device", "--retries", "0"])
            .apply(&mut config)
            .is_err());
    }
}
