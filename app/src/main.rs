#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{ChatInput, ChatStrategy, CommandStrategy, InitStrategy, VersionStrategy};

#[derive(Parser)]
#[command(name = "palaver")]
#[command(about = "Chatbot with per-user memory and optional web search", long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Identifier for the user
    #[arg(required = true)]
    user_id: Option<String>,

    /// Search the web before every reply
    #[arg(long)]
    search: bool,

    /// Model to use
    #[arg(short = 'M', long)]
    model: Option<String>,

    /// Single message to send
    #[arg(short = 'm', long)]
    message: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Some(Commands::Init) => InitStrategy.execute(()).await,
        Some(Commands::Version) => VersionStrategy.execute(()).await,
        None => {
            let user_id = cli
                .user_id
                .ok_or_else(|| anyhow::anyhow!("A user identifier is required"))?;
            ChatStrategy
                .execute(ChatInput {
                    user_id,
                    search: cli.search,
                    model: cli.model,
                    message: cli.message,
                })
                .await
        }
    }
}
