pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tickety_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "tickety",
    about = "Tickety operator CLI",
    long_about = "Evaluate ticket lifecycle permissions, SLA compliance reports, and runtime configuration against ticket snapshot files.",
    after_help = "Examples:\n  tickety actions --file tickets.json --actor u-100 --role agent\n  tickety report --file tickets.json --at 2026-03-02T12:00:00Z\n  tickety critical --file tickets.json --limit 3\n  tickety doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Evaluate which lifecycle actions an actor may take on each snapshot")]
    Actions {
        #[arg(long, help = "Path to a JSON file holding an array of ticket snapshots")]
        file: PathBuf,
        #[arg(long, help = "Acting user id")]
        actor: String,
        #[arg(long, help = "Acting role: user, agent, or admin")]
        role: String,
    },
    #[command(about = "Build an SLA compliance report from ticket snapshots")]
    Report {
        #[arg(long, help = "Path to a JSON file holding an array of ticket snapshots")]
        file: PathBuf,
        #[arg(long, help = "Evaluate as of this RFC 3339 instant instead of the current time")]
        at: Option<String>,
    },
    #[command(about = "List active tickets furthest past their SLA threshold")]
    Critical {
        #[arg(long, help = "Path to a JSON file holding an array of ticket snapshots")]
        file: PathBuf,
        #[arg(long, help = "Cap the listing (defaults to sla.critical_limit)")]
        limit: Option<usize>,
        #[arg(long, help = "Evaluate as of this RFC 3339 instant instead of the current time")]
        at: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and SLA threshold readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging(config: &AppConfig) {
    use tickety_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands surface config errors in their own envelopes, so logging falls
    // back to defaults instead of failing the whole invocation here.
    let logging_config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    init_logging(&logging_config);

    let result = match cli.command {
        Command::Actions { file, actor, role } => commands::actions::run(&file, &actor, &role),
        Command::Report { file, at } => commands::report::run(&file, at.as_deref()),
        Command::Critical { file, limit, at } => {
            commands::critical::run(&file, limit, at.as_deref())
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
