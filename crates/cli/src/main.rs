mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use tracing_subscriber::EnvFilter;

use commands::env::EnvAction;

#[derive(Parser)]
#[command(name = "cloudenv")]
#[command(version, about = "Manage hosted application environments", long_about = None)]
struct Cli {
    /// Log API requests and responses to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Store API credentials in ~/.cloudenv/config.toml
    ///
    /// CLOUDENV_API_TOKEN and CLOUDENV_API_URL override the stored values.
    Setup,

    /// Run an action against one environment
    Env {
        /// Environment id (e.g. 24-a47ac10b-58cc-4372-a567-0e02b2c3d470)
        env_id: String,

        #[command(subcommand)]
        action: EnvAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn initialize_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    initialize_logging(cli.verbose);

    match cli.command {
        Command::Setup => commands::setup::run().await,
        Command::Env { env_id, action } => commands::env::run(env_id, action).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cloudenv", &mut io::stdout());
            Ok(())
        }
    }
}
