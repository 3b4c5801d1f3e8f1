use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::infra::boot;
use crate::infra::config::Config;
use crate::tools::registry;

#[derive(Parser, Debug)]
#[command(name = "mysql-mcp-gateway")]
#[command(about = "MySQL gateway for AI agents over line-delimited JSON on stdio")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// TOML config file (overrides MYSQL_MCP_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds between heartbeat checks
    #[arg(long, global = true)]
    pub heartbeat_secs: Option<u64>,

    /// Seconds of silence before a heartbeat is sent
    #[arg(long, global = true)]
    pub idle_secs: Option<u64>,

    /// Accept tool calls before `initialize`
    #[arg(long, global = true)]
    pub no_handshake: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve requests on stdin/stdout (default)
    Serve,
    /// Print the effective configuration
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        validate: bool,
    },
    /// Print the tool catalog as JSON
    Tools,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let cfg = match effective_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    run_commands(cli.command.unwrap_or(Commands::Serve), cfg).await
}

/// File (flag or env), then environment, then flags.
pub fn effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let mut cfg = Config::from_toml_file(path)?;
            cfg.apply_env();
            cfg
        }
        None => Config::load()?,
    };
    if let Some(secs) = cli.heartbeat_secs {
        cfg.heartbeat_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.idle_secs {
        cfg.idle_threshold = Duration::from_secs(secs);
    }
    if cli.no_handshake {
        cfg.require_initialize = false;
    }
    Ok(cfg)
}

pub async fn run_commands(command: Commands, cfg: Config) -> ExitCode {
    match command {
        Commands::Serve => match boot::run_stdio(cfg).await {
            Ok(reason) => {
                tracing::info!(reason = ?reason, "stopped");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "gateway failed");
                eprintln!("{e:#}");
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate } => match cfg.validate() {
            Ok(()) => {
                if !validate {
                    println!("{}", render_config(&cfg));
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Tools => match serde_json::to_string_pretty(&registry::list()) {
            Ok(s) => {
                println!("{s}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn render_config(cfg: &Config) -> String {
    let c = &cfg.connection;
    let v = json!({
        "server": {
            "heartbeat_interval_secs": cfg.heartbeat_interval.as_secs(),
            "idle_threshold_secs": cfg.idle_threshold.as_secs(),
            "require_initialize": cfg.require_initialize,
        },
        "database": {
            "host": c.host,
            "port": c.port,
            "user": c.user,
            "password": c.password.as_ref().map(|_| "<redacted>"),
            "database": c.database,
            "autoconnect": cfg.autoconnect,
        }
    });
    serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())
}
