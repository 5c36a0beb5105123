mod check_cmd;
mod serve_cmd;
mod terminal_output;
mod tree_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pagetree_config::defaults::DEFAULT_SEPARATOR;

#[derive(Parser)]
#[command(name = "pagetree")]
#[command(about = "Telegram bot serving pages from a directory tree")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the commands and start the Telegram bot
    Serve {
        /// Path to pagetree.yaml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Build and dry-run a commands directory without serving it
    Check {
        dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_SEPARATOR)]
        separator: String,
    },
    /// Print the command hierarchy of a commands directory
    Tree {
        dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_SEPARATOR)]
        separator: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve_cmd::run(config.as_deref()).await,
        Commands::Check { dir, separator } => check_cmd::run(&dir, &separator).await,
        Commands::Tree { dir, separator } => tree_cmd::run(&dir, &separator).await,
    }
}
