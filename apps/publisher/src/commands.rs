//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;

use besluitpub_shared::{AppConfig, init_config, load_config, load_config_from};
use besluitpub_store::SparqlStore;

use crate::http;
use crate::service;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// besluit-publicatie — publish extracted meeting records to the store.
#[derive(Parser)]
#[command(
    name = "besluitpub",
    version,
    about = "Extract RDFa meeting records and publish them to the triple store.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the config file (defaults to ~/.besluit-publicatie/).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP trigger endpoint and the poll scheduler.
    Serve,

    /// Process the current backlog once and exit.
    Once,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "besluitpub=info",
        1 => "besluitpub=debug",
        _ => "besluitpub=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Serve => cmd_serve(config).await,
        Command::Once => cmd_once(config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config).await,
        },
    }
}

async fn cmd_serve(config: AppConfig) -> Result<()> {
    let store = Arc::new(SparqlStore::new(&config.store)?);
    let config = Arc::new(config);

    let (jobs, _worker) = service::spawn_queue(store, config.clone());
    let _scheduler = service::spawn_scheduler(jobs.clone(), config.publisher.poll_interval_secs);

    let listener = tokio::net::TcpListener::bind(&config.publisher.listen_addr).await?;
    info!(
        listen = %config.publisher.listen_addr,
        endpoint = %config.store.endpoint,
        poll_interval_secs = config.publisher.poll_interval_secs,
        "publisher started"
    );

    axum::serve(listener, http::router(jobs)).await?;
    Ok(())
}

async fn cmd_once(config: AppConfig) -> Result<()> {
    let store = SparqlStore::new(&config.store)?;
    service::publish_batch(&store, &config, "cli run").await?;
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
