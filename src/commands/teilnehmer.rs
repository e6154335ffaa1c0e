use clap::{Args, Subcommand};
use exkursion_core::{RecordsStore, TeilnehmerStatus};
use std::path::PathBuf;

use super::{confirm, require_admin, truncate, OutputFormat};

#[derive(Args)]
pub struct TeilnehmerCommand {
    #[command(subcommand)]
    pub command: TeilnehmerSubcommand,
}

#[derive(Subcommand)]
pub enum TeilnehmerSubcommand {
    /// List recorded submissions
    List {
        /// Only submissions for this excursion
        #[arg(long, short)]
        excursion: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change a submission's status
    Status {
        /// Teilnehmer ID
        id: String,

        /// eingegangen, bestaetigt or abgelehnt
        status: TeilnehmerStatus,
    },

    /// Delete a submission
    Delete {
        /// Teilnehmer ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Export submissions as CSV
    Export {
        /// Only submissions for this excursion
        #[arg(long, short)]
        excursion: Option<String>,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl TeilnehmerCommand {
    pub fn run(&self, records: &mut RecordsStore) -> Result<(), Box<dyn std::error::Error>> {
        require_admin(records)?;

        match &self.command {
            TeilnehmerSubcommand::List { excursion, format } => {
                let entries = records.teilnehmer_by_excursion(excursion.as_deref());

                if entries.is_empty() {
                    println!("No teilnehmer found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<36}  {:<24}  {:<16}  {:<11}  EINGEGANGEN",
                            "ID", "NAME", "EXKURSION", "STATUS"
                        );
                        println!("{}", "-".repeat(110));
                        for entry in &entries {
                            println!(
                                "{:<36}  {:<24}  {:<16}  {:<11}  {}",
                                truncate(&entry.id, 36),
                                truncate(&entry.persoenlich.full_name(), 24),
                                truncate(&entry.exkursion_id, 16),
                                entry.status,
                                entry.submitted_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                        println!("\nTotal: {} teilnehmer", entries.len());
                    }
                }
                Ok(())
            }

            TeilnehmerSubcommand::Status { id, status } => {
                if !records.update_status(id, *status)? {
                    return Err(format!("Teilnehmer not found: {}", id).into());
                }
                println!("Status of {} set to {}", id, status);
                Ok(())
            }

            TeilnehmerSubcommand::Delete { id, force } => {
                let name = match records.teilnehmer_by_id(id) {
                    Some(entry) => entry.persoenlich.full_name(),
                    None => return Err(format!("Teilnehmer not found: {}", id).into()),
                };

                if !force && !confirm(&format!("Delete submission of '{}'?", name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                records.delete_teilnehmer(id)?;
                println!("Deleted teilnehmer: {}", id);
                Ok(())
            }

            TeilnehmerSubcommand::Export { excursion, output } => {
                let csv = records.export_csv(excursion.as_deref());
                match output {
                    Some(path) => {
                        std::fs::write(path, csv.as_bytes())?;
                        let rows = records.teilnehmer_by_excursion(excursion.as_deref()).len();
                        eprintln!("Exported {} row(s) to {}", rows, path.display());
                    }
                    None => print!("{}", csv),
                }
                Ok(())
            }
        }
    }
}
