//! Lytics command-line tools
//!
//! Usage:
//!   lytics watch ./queries --max 10
//!   lytics function todate 2024-01-01
//!   lytics whitelist --aid 1234 add email
//!
//! The API key is read from `--key` or the `LIOKEY` environment variable.
//! Log output is chosen with `--log <error|warn|info|verbose|debug|trace>` and
//! `--no-color`.

mod function;
mod watch;
mod whitelist;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lytics_sdk::config::mask_key;
use lytics_sdk::{LyticsClient, LyticsConfig};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "lytics")]
#[command(about = "Command-line tools for the Lytics API")]
struct Args {
    /// Lytics API key
    #[arg(short, long, env = "LIOKEY", hide_env_values = true, global = true)]
    key: Option<String>,

    /// Lytics API host
    #[arg(long, env = "LIO_API_BASE", global = true)]
    api_base: Option<String>,

    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log: LogLevel,

    /// Enable verbose debug logging (same as --log debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored log output
    #[arg(short = 'C', long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LogLevel {
    Error,
    Warn,
    Info,
    #[value(alias = "verbose")]
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl Args {
    fn log_level(&self) -> Level {
        if self.verbose && self.log < LogLevel::Debug {
            return Level::DEBUG;
        }
        self.log.into()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test LQL files against sample data whenever either changes
    Watch(watch::WatchArgs),
    /// Invoke an LQL function with literal parameters
    Function(function::FunctionArgs),
    /// Manage the user fields available through the API
    Whitelist(whitelist::WhitelistArgs),
}

fn client_for(args: &Args) -> Result<LyticsClient> {
    let key = args
        .key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .context("API key must be specified as an option or in the environment variable LIOKEY")?;
    info!("API key: {}", mask_key(key));

    let mut config = LyticsConfig::new(key);
    if let Some(base) = args.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
        info!("API host: {}", base);
        config = config.with_api_base(base);
    }
    Ok(LyticsClient::new(config)?)
}

async fn run(args: Args) -> Result<()> {
    let client = client_for(&args)?;
    match args.command {
        Command::Watch(watch_args) => watch::run(&client, watch_args).await,
        Command::Function(function_args) => function::run(&client, function_args).await,
        Command::Whitelist(whitelist_args) => whitelist::run(&client, whitelist_args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_ansi(!args.no_color)
        .with_target(false)
        .compact()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
