//! Command-line front end: Fourier expansions, simplification and
//! integration of single expressions.

mod commands;
mod config;
mod json_types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{CliConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "cas_cli", version, about = "Fourier series on a small symbolic engine")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fourier series of an expression over [from, to]
    Fourier(commands::fourier::FourierArgs),
    /// Simplify an expression
    Simplify(commands::simplify::SimplifyArgs),
    /// Integrate an expression, optionally between bounds
    Integrate(commands::integrate::IntegrateArgs),
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CliConfig::load(&cli.config);
    init_tracing(&config);

    let result = match cli.command {
        Command::Fourier(args) => commands::fourier::run(args, &config),
        Command::Simplify(args) => commands::simplify::run(args, &config),
        Command::Integrate(args) => commands::integrate::run(args, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
