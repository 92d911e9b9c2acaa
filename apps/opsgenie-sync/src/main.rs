//! opsgenie-sync - run the Opsgenie connector from the command line
//!
//! `validate` checks the API key; `sync` runs a full pass and writes the
//! collected resources, entitlements and grants as JSON.

use std::collections::HashMap;
use std::env::VarError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use xavyo_connector::prelude::*;
use xavyo_connector_opsgenie::{ConfigError, OpsgenieConfig, OpsgenieConnector};

/// Opsgenie identity sync
///
/// Connection flags override the matching `OPSGENIE_*` variables.
#[derive(Parser)]
#[command(name = "opsgenie-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Opsgenie API key [env: OPSGENIE_API_KEY]
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL [env: OPSGENIE_BASE_URL]
    #[arg(long, hide = true)]
    base_url: Option<String>,

    /// Users fetched per page, 1-100 [env: OPSGENIE_PAGE_SIZE]
    #[arg(long)]
    page_size: Option<u32>,

    /// Retries on rate limits and server errors [env: OPSGENIE_MAX_RETRIES]
    #[arg(long)]
    max_retries: Option<u32>,

    /// Per-request timeout in seconds [env: OPSGENIE_REQUEST_TIMEOUT_SECS]
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Abort the whole run after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API key is accepted
    Validate,

    /// Run a full sync pass and print the snapshot as JSON
    Sync {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("failed to write snapshot: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xavyo_connector_opsgenie=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_signal.cancel();
        }
    });

    let mut ctx = SyncContext::with_cancellation(cancel);
    if let Some(secs) = cli.timeout_secs {
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    if let Err(e) = run(cli, ctx).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

impl Cli {
    /// Flags given on the command line, keyed by the variable they replace.
    fn overrides(&self) -> HashMap<&'static str, String> {
        let mut vars = HashMap::new();
        if let Some(key) = &self.api_key {
            vars.insert("OPSGENIE_API_KEY", key.clone());
        }
        if let Some(url) = &self.base_url {
            vars.insert("OPSGENIE_BASE_URL", url.clone());
        }
        if let Some(size) = self.page_size {
            vars.insert("OPSGENIE_PAGE_SIZE", size.to_string());
        }
        if let Some(retries) = self.max_retries {
            vars.insert("OPSGENIE_MAX_RETRIES", retries.to_string());
        }
        if let Some(secs) = self.request_timeout_secs {
            vars.insert("OPSGENIE_REQUEST_TIMEOUT_SECS", secs.to_string());
        }
        vars
    }
}

fn load_config<F>(
    overrides: &HashMap<&'static str, String>,
    env: F,
) -> Result<OpsgenieConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    OpsgenieConfig::from_reader(|key| match overrides.get(key) {
        Some(value) => Ok(value.clone()),
        None => env(key),
    })
}

async fn run(cli: Cli, ctx: SyncContext) -> Result<(), CliError> {
    let config = load_config(&cli.overrides(), |key| std::env::var(key))
        .map_err(ConnectorError::from)?;
    let connector = OpsgenieConnector::new(config)?;

    match cli.command {
        Commands::Validate => {
            connector.validate(&ctx).await?;
            let metadata = connector.metadata();
            println!("{}: credentials OK", metadata.display_name);
        }
        Commands::Sync { output } => {
            connector.validate(&ctx).await?;
            let snapshot = SyncRunner::new(&connector).run(&ctx).await?;

            tracing::info!(
                resources = snapshot.resources.len(),
                entitlements = snapshot.entitlements.len(),
                grants = snapshot.grants.len(),
                "writing snapshot"
            );

            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout().lock()),
            };
            let mut writer = BufWriter::new(writer);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, VarError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_env_only() {
        let cli = Cli::try_parse_from(["opsgenie-sync", "validate"]).unwrap();
        let env = env_of(&[("OPSGENIE_API_KEY", "env-key"), ("OPSGENIE_MAX_RETRIES", "4")]);

        let config = load_config(&cli.overrides(), env).unwrap();
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.page_size, xavyo_connector_opsgenie::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_flags_override_env() {
        let cli = Cli::try_parse_from([
            "opsgenie-sync",
            "--api-key",
            "flag-key",
            "--page-size",
            "10",
            "--request-timeout-secs",
            "5",
            "validate",
        ])
        .unwrap();
        let env = env_of(&[("OPSGENIE_API_KEY", "env-key"), ("OPSGENIE_PAGE_SIZE", "50")]);

        let config = load_config(&cli.overrides(), env).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.connection.request_timeout_secs, 5);
    }

    #[test]
    fn test_missing_key_is_invalid_configuration() {
        let cli = Cli::try_parse_from(["opsgenie-sync", "sync"]).unwrap();

        let err = load_config(&cli.overrides(), env_of(&[])).unwrap_err();
        assert!(matches!(
            ConnectorError::from(err),
            ConnectorError::InvalidConfiguration { .. }
        ));
    }

    #[test]
    fn test_out_of_range_flag_rejected() {
        let cli =
            Cli::try_parse_from(["opsgenie-sync", "--page-size", "500", "validate"]).unwrap();
        let env = env_of(&[("OPSGENIE_API_KEY", "k")]);

        let err = load_config(&cli.overrides(), env).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue(ref var, _) if var == "OPSGENIE_PAGE_SIZE")
        );
    }
}
