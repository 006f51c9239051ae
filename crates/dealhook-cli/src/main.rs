mod commands;
mod error;
mod server;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{city, completions, enrich, phone, serve, Context};
use crate::error::{exit_code_for, report_error};
use dealhook_config as config;

#[derive(Debug, Parser)]
#[command(name = "dealhook", version, about = "Bitrix24 deal enrichment webhook")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the webhook server
    Serve(serve::ServeArgs),
    /// Enrich one deal and print what changed
    Enrich(enrich::EnrichArgs),
    #[command(subcommand)]
    City(city::CityCommand),
    /// Normalize a phone number
    Phone(phone::PhoneArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose, matches!(cli.command, Command::Serve(_)));
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }

            let ctx = Context {
                json,
                config: &app_config,
            };

            match command {
                Command::Serve(args) => serve::serve(&ctx, args),
                Command::Enrich(args) => enrich::enrich_deal(&ctx, args),
                Command::City(cmd) => match cmd {
                    city::CityCommand::Resolve(args) => city::resolve(&ctx, args),
                    city::CityCommand::Extract(args) => city::extract(&ctx, args),
                    city::CityCommand::List(args) => city::list(&ctx, args),
                },
                Command::Phone(args) => phone::normalize(&ctx, args),
                Command::Completions(_) => {
                    unreachable!("completions command handled before config load")
                }
            }
        }
    }
}

fn init_logging(verbose: bool, server: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = match (verbose, server) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if server {
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .try_init();
    }
}
