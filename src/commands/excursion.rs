use clap::{Args, Subcommand};
use exkursion_core::{Excursion, ExcursionInput, RecordsStore};

use super::{confirm, require_admin, truncate, OutputFormat};

#[derive(Args)]
pub struct ExcursionCommand {
    #[command(subcommand)]
    pub command: ExcursionSubcommand,
}

#[derive(Subcommand)]
pub enum ExcursionSubcommand {
    /// List excursions
    List {
        /// Include archived excursions
        #[arg(long, short)]
        all: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create an excursion, or update the one with the same ID
    Upsert {
        /// Excursion ID
        #[arg(long)]
        id: String,

        /// Title
        #[arg(long)]
        titel: String,

        /// Date, as shown to participants
        #[arg(long)]
        datum: String,

        /// Location
        #[arg(long)]
        ort: String,

        /// Description
        #[arg(long)]
        beschreibung: Option<String>,

        /// Number of places (0 or less means unlimited)
        #[arg(long, allow_negative_numbers = true)]
        kapazitaet: Option<i64>,

        /// Archived flag (kept as-is on update when omitted)
        #[arg(long)]
        archived: Option<bool>,

        /// Current ID of the excursion to rename
        #[arg(long)]
        original_id: Option<String>,
    },

    /// Archive an excursion so it is no longer offered
    Archive {
        /// Excursion ID
        id: String,

        /// Offer the excursion again
        #[arg(long)]
        restore: bool,
    },

    /// Delete an excursion (its submissions are kept)
    Delete {
        /// Excursion ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ExcursionCommand {
    pub fn run(&self, records: &mut RecordsStore) -> Result<(), Box<dyn std::error::Error>> {
        require_admin(records)?;

        match &self.command {
            ExcursionSubcommand::List { all, format } => {
                let excursions: Vec<&Excursion> = records
                    .excursions()
                    .iter()
                    .filter(|e| *all || !e.archived)
                    .collect();

                if excursions.is_empty() {
                    println!("No excursions found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&excursions)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<16}  {:<30}  {:<12}  {:<20}  PLÄTZE",
                            "ID", "TITEL", "DATUM", "ORT"
                        );
                        println!("{}", "-".repeat(90));
                        for excursion in &excursions {
                            let places = excursion
                                .kapazitaet
                                .map(|k| k.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            let archived = if excursion.archived { " (archiviert)" } else { "" };
                            println!(
                                "{:<16}  {:<30}  {:<12}  {:<20}  {}{}",
                                truncate(&excursion.id, 16),
                                truncate(&excursion.titel, 30),
                                truncate(&excursion.datum, 12),
                                truncate(&excursion.ort, 20),
                                places,
                                archived
                            );
                        }
                        println!("\nTotal: {} excursion(s)", excursions.len());
                    }
                }
                Ok(())
            }

            ExcursionSubcommand::Upsert {
                id,
                titel,
                datum,
                ort,
                beschreibung,
                kapazitaet,
                archived,
                original_id,
            } => {
                let mut input = ExcursionInput::new(id, titel, datum, ort);
                if let Some(beschreibung) = beschreibung {
                    input = input.with_beschreibung(beschreibung);
                }
                if let Some(kapazitaet) = kapazitaet {
                    input = input.with_kapazitaet(*kapazitaet);
                }
                if let Some(archived) = archived {
                    input = input.with_archived(*archived);
                }

                let saved = records.upsert_excursion(input, original_id.as_deref())?;
                println!("Saved excursion:");
                println!("{}", saved);
                Ok(())
            }

            ExcursionSubcommand::Archive { id, restore } => {
                if !records.toggle_archive(id, !restore)? {
                    return Err(format!("Excursion not found: {}", id).into());
                }
                if *restore {
                    println!("Restored excursion: {}", id);
                } else {
                    println!("Archived excursion: {}", id);
                }
                Ok(())
            }

            ExcursionSubcommand::Delete { id, force } => {
                let label = match records.excursion_by_id(id) {
                    Some(excursion) => excursion.label(),
                    None => return Err(format!("Excursion not found: {}", id).into()),
                };

                if !force && !confirm(&format!("Delete excursion '{}'?", label))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                records.delete_excursion(id)?;
                println!("Deleted excursion: {}", label);
                Ok(())
            }
        }
    }
}
