use clap::{Parser, Subcommand};
use exkursion_core::{FileStorage, LocalStorage, RecordsStore, RegistrationDraftStore};
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod config;

use commands::{AdminCommand, ConfigCommand, DraftCommand, ExcursionCommand, TeilnehmerCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "exkursion")]
#[command(version)]
#[command(about = "Excursion registration and admin records", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log the admin in or out
    Admin(AdminCommand),

    /// Manage offered excursions (admin)
    Excursion(ExcursionCommand),

    /// Fill in and submit a registration
    Draft(DraftCommand),

    /// Review and export submissions (admin)
    Teilnehmer(TeilnehmerCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exkursion=warn,exkursion_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    tracing::debug!("Using data directory {}", config.data_dir.value.display());

    let storage: Arc<dyn LocalStorage> =
        Arc::new(FileStorage::new(config.data_dir.value.clone()));
    let mut records = RecordsStore::new(storage.clone(), config.admin_token.value.clone());

    match cli.command {
        Some(Commands::Admin(cmd)) => {
            cmd.run(&mut records)?;
        }
        Some(Commands::Excursion(cmd)) => {
            cmd.run(&mut records)?;
        }
        Some(Commands::Draft(cmd)) => {
            let mut draft = RegistrationDraftStore::load(storage);
            cmd.run(&mut draft, &mut records)?;
        }
        Some(Commands::Teilnehmer(cmd)) => {
            cmd.run(&mut records)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    if let Some(message) = records.error() {
        eprintln!("Warnung: {}", message);
    }

    Ok(())
}
