pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "petsit",
    about = "Petsit operator CLI",
    long_about = "Operate Petsit migrations, demo fixtures, config inspection, and pricing lookups.",
    after_help = "Examples:\n  petsit doctor --json\n  petsit seed\n  petsit recommend garde hour --token <session>"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo dataset and verify it against its contract")]
    Seed,
    #[command(about = "Query a price recommendation for a category and billing unit")]
    Recommend {
        #[arg(help = "Service category slug, e.g. garde")]
        category: String,
        #[arg(help = "Billing unit: hour|half_day|day|week|month|flat")]
        unit: String,
        #[arg(long, help = "Seller session token for localized, comparable-backed results")]
        token: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Recommend { category, unit, token } => {
            commands::recommend::run(&category, &unit, token.as_deref())
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
