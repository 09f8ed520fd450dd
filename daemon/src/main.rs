//! Wardpass daemon — entry point for running the credential service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use wardpass_node::{
    spawn_sweep_loop, ExpirySweeper, IssueRequest, NodeConfig, PassService, VerifyRequest,
};
use wardpass_notify::{HttpMailer, LogOnlyNotifier, MailerConfig, NotificationSink};
use wardpass_store_lmdb::LmdbCredentialStore;
use wardpass_token::{SigningSecret, TokenService};

/// Environment variable holding the process-wide signing secret.
const SECRET_ENV: &str = "WARDPASS_SECRET";
/// Environment variable holding the mail API key.
const MAIL_KEY_ENV: &str = "WARDPASS_MAIL_API_KEY";

#[derive(Parser)]
#[command(name = "wardpass-daemon", about = "Wardpass credential service daemon")]
struct Cli {
    /// Data directory for the credential store.
    #[arg(long, env = "WARDPASS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Seconds between expiry sweep runs.
    #[arg(long, env = "WARDPASS_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "WARDPASS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the service: open the store and start the expiry sweep.
    Run,
    /// Issue a credential and print the identity plus its token.
    Issue {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        email: String,
    },
    /// Verify a token and print the decision.
    Verify {
        #[arg(long)]
        token: String,
        #[arg(long)]
        geo_lat: Option<f64>,
        #[arg(long)]
        geo_long: Option<f64>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(&path.display().to_string())
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(interval) = cli.sweep_interval_secs {
        config.sweep_interval_secs = interval;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn build_sink(config: &NodeConfig) -> anyhow::Result<Arc<dyn NotificationSink>> {
    if !config.mailer_configured() {
        tracing::warn!("no mailer configured, expiry notices are log-only");
        return Ok(Arc::new(LogOnlyNotifier));
    }
    let api_key = std::env::var(MAIL_KEY_ENV)
        .with_context(|| format!("{MAIL_KEY_ENV} must be set when a mailer is configured"))?;
    let mailer = HttpMailer::new(MailerConfig {
        api_url: config.mail_api_url.clone().unwrap_or_default(),
        api_key,
        sender: config.mail_sender.clone().unwrap_or_default(),
    })?;
    Ok(Arc::new(mailer))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    wardpass_utils::init_tracing(&config.log_level, &config.log_format);

    // The signing secret is mandatory: a missing or empty value aborts
    // startup rather than falling back to any default.
    let secret = SigningSecret::from_env(SECRET_ENV)
        .with_context(|| format!("{SECRET_ENV} must be set to a non-empty value"))?;

    let store = Arc::new(
        LmdbCredentialStore::open(&config.data_dir)
            .with_context(|| format!("opening store at {}", config.data_dir.display()))?,
    );
    let tokens = Arc::new(TokenService::new(secret));
    let service = PassService::new(tokens, store.clone(), config.params());

    match cli.command {
        Command::Run => {
            let sink = build_sink(&config)?;
            let sweeper = Arc::new(ExpirySweeper::new(store, sink));
            let sweep_handle = spawn_sweep_loop(sweeper, config.sweep_interval_secs);
            tracing::info!(
                data_dir = %config.data_dir.display(),
                sweep_interval_secs = config.sweep_interval_secs,
                "wardpass daemon running"
            );

            tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
            tracing::info!("shutting down");
            sweep_handle.abort();
        }
        Command::Issue { name, role, email } => {
            let response = service.issue(IssueRequest { name, role, email })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Verify {
            token,
            geo_lat,
            geo_long,
        } => {
            let response = service.verify(VerifyRequest {
                token,
                geo_lat,
                geo_long,
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
