use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ConfigCommand, ImportCommand, MenuCommand};
use kruatayai::config::Config;
use kruatayai::db::{init_db, DataImporter, MenuRepository};

#[derive(Parser)]
#[command(name = "kruatayai")]
#[command(version)]
#[command(about = "Admin tools for the Krua Tayai restaurant site", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import legacy JSON data files into the database
    Import(ImportCommand),

    /// Inspect the stored menu
    Menu(MenuCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kruatayai=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Import(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            cmd.run(&DataImporter::new(pool)).await?;
        }
        Some(Commands::Menu(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            cmd.run(&MenuRepository::new(pool)).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
