use std::error::Error;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    analyze::{self, AnalyzeArgs},
    cumulative::{self, CumulativeArgs},
    fractions::{self, FractionsArgs},
    integrate::{self, IntegrateArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "snowflash",
    about = "Aggregate SNOwGLoBES detector channels and integrate them over time"
)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build per-model time-series tables from SNOwGLoBES output.
    Analyze(AnalyzeArgs),
    /// Integrate time-series tables over increasing numbers of time bins.
    Cumulative(CumulativeArgs),
    /// Integrate time-series tables over a fixed window per family.
    Integrate(IntegrateArgs),
    /// Compare category shares of total counts across families.
    Fractions(FractionsArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Analyze(args) => analyze::run(&args),
        Command::Cumulative(args) => cumulative::run(&args),
        Command::Integrate(args) => integrate::run(&args),
        Command::Fractions(args) => fractions::run(&args),
    }
}
