//! actloop CLI: the main entry point.
//!
//! Commands:
//! - `run`      Run one task through the agent loop
//! - `gateway`  Start the HTTP gateway
//! - `tools`    Print the tool listing the model sees
//! - `onboard`  Initialize config & workspace

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "actloop",
    about = "actloop: a single-agent Think-Act-Observe loop with workspace tools",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single task and print the result
    Run {
        /// The task to accomplish
        task: String,

        /// Override the iteration budget
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Only print the final result
        #[arg(short, long)]
        quiet: bool,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the registered tools as the model sees them
    Tools,

    /// Initialize configuration and workspace
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Run {
            task,
            max_iterations,
            quiet,
        } => commands::run::run(task, max_iterations, quiet).await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
