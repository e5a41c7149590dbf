//! Luopan CLI - feng-shui survey compass on the command line
//!
//! Thin surface over the `luopan` library: measure between points, classify
//! bearings, convert map coordinates, build life circles and run sector
//! searches.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use luopan::config::ConfigFile;

use commands::config::ConfigCommands;
use commands::geo::{ClassifyArgs, ConvertArgs, MeasureArgs};
use commands::life_circle::LifeCircleArgs;
use commands::search::SearchArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "luopan", version, about = "Feng-shui survey compass")]
struct Cli {
    /// Enable debug logging (overrides logging.level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bearing, distance and shan sector from one point to another
    Measure(MeasureArgs),

    /// Shan sector, trigram and element of a bearing
    Classify(ClassifyArgs),

    /// Convert a point between WGS-84 and GCJ-02
    Convert(ConvertArgs),

    /// Assign home/work/leisure roles and list the connections between them
    LifeCircle(LifeCircleArgs),

    /// Search for places inside a compass sector
    Search(SearchArgs),

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    // Config commands must work even when the file is broken
    if let Commands::Config { command } = cli.command {
        return commands::config::run(command);
    }

    let config = ConfigFile::load().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using default settings", e);
        ConfigFile::default()
    });

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    let _guard = luopan::logging::init_logging(&logging)?;

    match cli.command {
        Commands::Measure(args) => commands::geo::run_measure(args, &config),
        Commands::Classify(args) => commands::geo::run_classify(args),
        Commands::Convert(args) => commands::geo::run_convert(args),
        Commands::LifeCircle(args) => commands::life_circle::run(args, &config),
        Commands::Search(args) => commands::search::run(args, &config),
        Commands::Config { .. } => Ok(()),
    }
}
