use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use marketboard::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP API server
    Serve {
        /// Port to listen on, overriding the configured address
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },
    /// List tracked instruments
    Catalog,
    /// Display current prices for all tracked instruments
    Snapshot {
        /// Print the API JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Display price history for one or more symbols
    History {
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Time range, e.g. 1d, 5d, 1mo, 1y
        #[arg(short, long, default_value = marketboard::core::service::DEFAULT_RANGE)]
        range: String,
        /// Sampling interval, e.g. 5m, 1h, 1d
        #[arg(short, long, default_value = marketboard::core::service::DEFAULT_INTERVAL)]
        interval: String,
        /// Print the API JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

impl From<Commands> for marketboard::AppCommand {
    fn from(cmd: Commands) -> marketboard::AppCommand {
        match cmd {
            Commands::Serve { port } => marketboard::AppCommand::Serve { port },
            Commands::Catalog => marketboard::AppCommand::Catalog,
            Commands::Snapshot { json } => marketboard::AppCommand::Snapshot { json },
            Commands::History {
                symbols,
                range,
                interval,
                json,
            } => marketboard::AppCommand::History {
                symbols,
                range,
                interval,
                json,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Some(Commands::Serve { .. }) => "info",
        _ => "warn",
    };
    init_logging(cli.verbose, default_level);

    let result = match cli.command {
        Some(Commands::Setup) => marketboard::cli::setup::setup(),
        Some(cmd) => marketboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
