mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::freight::FreightArgs;
use commands::loan::EmiArgs;
use commands::passenger::PassengerArgs;
use commands::sensitivity::SensitivityArgs;
use commands::tco::TcoArgs;

/// Commercial-vehicle finance estimators
#[derive(Parser)]
#[command(
    name = "fleetcalc",
    version,
    about = "Commercial-vehicle finance estimators",
    long_about = "A CLI for dealership finance estimates with decimal precision. \
                  Supports loan EMI and amortization, total cost of ownership, \
                  goods-carrier freight profit, bus and van route profit, and \
                  sensitivity sweeps over any of them."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter written to stderr (e.g. "debug"); falls back to RUST_LOG, then "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly installment and amortization schedule for a vehicle loan
    Emi(EmiArgs),
    /// Total cost of ownership: EMI, fuel, upkeep, insurance, tyres, resale
    Tco(TcoArgs),
    /// Monthly and five-year profit of a goods carrier
    Freight(FreightArgs),
    /// Daily, monthly and five-year profit of a bus or van route
    Passenger(PassengerArgs),
    /// Run sensitivity analysis on any model
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args),
        Commands::Tco(args) => commands::tco::run_tco(args),
        Commands::Freight(args) => commands::freight::run_freight(args),
        Commands::Passenger(args) => commands::passenger::run_passenger(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("fleetcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
