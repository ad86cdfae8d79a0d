//! Locator Web Server
//!
//! Serves the last-known location of the configured account over HTTP.

use anyhow::Context;
use clap::Parser;
use locator_client::session_manager_from_config;
use locator_core::{init_logging, LocatorConfig};
use locator_web::{LocatorServerBuilder, WebConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Locator Web Server - last-known device location proxy
#[derive(Parser)]
#[command(name = "locator-web")]
#[command(about = "HTTP endpoint for the last-known location of an account")]
#[command(version)]
struct Args {
    /// Server host to bind to [default: LOCATOR_HOST or 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on [default: LOCATOR_PORT or 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Append logs to this file instead of stdout
    #[arg(long)]
    log_file: Option<String>,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Command line values win over the environment
    fn web_config(&self, mut web: WebConfig) -> WebConfig {
        if let Some(host) = &self.host {
            web.host = host.clone();
        }
        if let Some(port) = self.port {
            web.port = port;
        }
        web
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    // Missing credentials stop the process here, before anything is served
    let mut config =
        LocatorConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    if let Some(level) = &args.log_level {
        config.logging.set_level(level);
    }
    if let Some(path) = &args.log_file {
        config.logging.log_to_file = true;
        config.logging.log_file_path = Some(path.clone());
    }
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let sessions = session_manager_from_config(&config)
        .context("Failed to create the account session manager")?;

    let web = args.web_config(WebConfig::from_env());

    info!(
        email = %config.account.email,
        service = %config.service.base_url,
        fetch_retries = config.fetch_retries,
        "Starting Locator Web Server"
    );
    if web.version == WebConfig::default().version {
        warn!("APP_VERSION is not set, reporting {}", web.version);
    }

    let server = LocatorServerBuilder::new()
        .config(web)
        .sessions(Arc::new(sessions))
        .build()
        .context("Failed to build server")?;

    server.start().await.context("Server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_config() -> WebConfig {
        WebConfig {
            host: "0.0.0.0".to_string(),
            port: 9090,
            version: "v3".to_string(),
        }
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["locator-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());

        let args = Args::parse_from([
            "locator-web",
            "--host",
            "10.0.0.1",
            "--port",
            "3000",
            "--log-file",
            "app.log",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(args.port, Some(3000));
        assert_eq!(args.log_file.as_deref(), Some("app.log"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_environment_applies_without_flags() {
        let web = Args::parse_from(["locator-web"]).web_config(env_config());
        assert_eq!(web.address(), "0.0.0.0:9090");
        assert_eq!(web.version, "v3");
    }

    #[test]
    fn test_flags_override_environment() {
        let web = Args::parse_from(["locator-web", "--port", "3000"]).web_config(env_config());
        assert_eq!(web.address(), "0.0.0.0:3000");
    }
}
