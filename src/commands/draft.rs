use clap::{Args, Subcommand};
use exkursion_core::{
    Ausweisart, Confirmation, ConfirmationsPatch, ExkursionPatch, Gruppenart, NotfallPatch,
    PersoenlichPatch, RecordsStore, RegistrationDraftStore, Reiseart,
};

use super::{optional_selection, OutputFormat};

#[derive(Args)]
pub struct DraftCommand {
    #[command(subcommand)]
    pub command: DraftSubcommand,
}

#[derive(Subcommand)]
pub enum DraftSubcommand {
    /// Show the current registration draft
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Choose the excursion to register for
    Select {
        /// Excursion ID
        excursion_id: String,
    },

    /// Set personal details
    Person {
        #[arg(long)]
        vorname: Option<String>,

        #[arg(long)]
        nachname: Option<String>,

        /// Personalausweis or Reisepass
        #[arg(long)]
        ausweisart: Option<Ausweisart>,

        #[arg(long)]
        ausweisnr: Option<String>,

        #[arg(long)]
        handy: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        matrikelnr: Option<String>,

        /// How the participant travels
        #[arg(long)]
        reiseart: Option<Reiseart>,

        /// Remove the travel mode
        #[arg(long, conflicts_with = "reiseart")]
        clear_reiseart: bool,

        /// Whether the participant travels with others
        #[arg(long)]
        gruppe: Option<Gruppenart>,

        /// Remove the group selection
        #[arg(long, conflicts_with = "gruppe")]
        clear_gruppe: bool,
    },

    /// Set the emergency contact
    Notfall {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        beziehung: Option<String>,

        #[arg(long)]
        telefon: Option<String>,
    },

    /// Set the free-text note
    Note {
        text: String,
    },

    /// Give (or with --revoke, withdraw) declarations
    Confirm {
        /// Declaration names, e.g. teilnahmebedingungen datenschutz
        #[arg(required = true)]
        names: Vec<Confirmation>,

        #[arg(long)]
        revoke: bool,
    },

    /// Discard the draft and start over
    Reset,

    /// Submit the draft
    Submit,
}

impl DraftCommand {
    pub fn run(
        &self,
        draft: &mut RegistrationDraftStore,
        records: &mut RecordsStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DraftSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(draft.draft())?);
                    }
                    OutputFormat::Text => print_draft(draft),
                }
                Ok(())
            }

            DraftSubcommand::Select { excursion_id } => {
                records.ensure_hydrated();
                let selection = records
                    .active_excursions()
                    .find(|e| e.id == *excursion_id)
                    .map(|e| e.snapshot())
                    .ok_or_else(|| format!("Excursion not found: {}", excursion_id))?;

                draft.set_exkursion(ExkursionPatch::from(selection))?;
                println!("Selected excursion: {}", draft.draft().exkursion.titel);
                Ok(())
            }

            DraftSubcommand::Person {
                vorname,
                nachname,
                ausweisart,
                ausweisnr,
                handy,
                email,
                matrikelnr,
                reiseart,
                clear_reiseart,
                gruppe,
                clear_gruppe,
            } => {
                draft.set_persoenlich(PersoenlichPatch {
                    vorname: vorname.clone(),
                    nachname: nachname.clone(),
                    ausweisart: *ausweisart,
                    ausweisnr: ausweisnr.clone(),
                    handy: handy.clone(),
                    email: email.clone(),
                    matrikelnr: matrikelnr.clone(),
                    reiseart: optional_selection(*reiseart, *clear_reiseart),
                    gruppe: optional_selection(*gruppe, *clear_gruppe),
                })?;
                println!("Updated personal details.");
                Ok(())
            }

            DraftSubcommand::Notfall {
                name,
                beziehung,
                telefon,
            } => {
                draft.set_notfall(NotfallPatch {
                    name: name.clone(),
                    beziehung: beziehung.clone(),
                    telefon: telefon.clone(),
                })?;
                println!("Updated emergency contact.");
                Ok(())
            }

            DraftSubcommand::Note { text } => {
                draft.set_note(text.as_str())?;
                println!("Updated note.");
                Ok(())
            }

            DraftSubcommand::Confirm { names, revoke } => {
                let patch = names
                    .iter()
                    .fold(ConfirmationsPatch::new(), |patch, which| {
                        patch.with(*which, !revoke)
                    });
                draft.set_confirmations(patch)?;

                let missing = draft.missing_confirmations();
                if missing.is_empty() {
                    println!("All declarations given.");
                } else {
                    let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
                    println!("Still missing: {}", names.join(", "));
                }
                Ok(())
            }

            DraftSubcommand::Reset => {
                draft.reset()?;
                println!("Draft reset. New registration: {}", draft.draft().anmeldung_id);
                Ok(())
            }

            DraftSubcommand::Submit => {
                if !draft.is_complete() {
                    tracing::warn!("Submitting an incomplete draft");
                }
                draft.submit(records)?;
                println!("Submitted registration {}", draft.draft().anmeldung_id);
                Ok(())
            }
        }
    }
}

fn print_draft(store: &RegistrationDraftStore) {
    let draft = store.draft();
    let person = &draft.persoenlich;

    println!("Registration {}", draft.anmeldung_id);
    println!("{}", "=".repeat(13 + draft.anmeldung_id.chars().count()));

    match draft.submitted_at {
        Some(at) => println!("Status: submitted {}", at.format("%Y-%m-%d %H:%M")),
        None if store.is_complete() => println!("Status: ready to submit"),
        None => println!("Status: incomplete"),
    }
    println!();

    if draft.exkursion.id.is_empty() {
        println!("Exkursion: -");
    } else {
        println!(
            "Exkursion: {} ({}), {} in {}",
            draft.exkursion.titel, draft.exkursion.id, draft.exkursion.datum, draft.exkursion.ort
        );
    }

    println!("Name: {}", store.full_name());
    println!("Ausweis: {} {}", person.ausweisart, person.ausweisnr);
    println!("E-Mail: {}", person.email);
    println!("Handy: {}", person.handy);
    println!("Matrikelnr: {}", person.matrikelnr);
    if let Some(reiseart) = person.reiseart {
        println!("Reiseart: {}", reiseart);
    }
    if let Some(gruppe) = person.gruppe {
        println!("Gruppe: {}", gruppe);
    }

    let notfall = &draft.notfall;
    println!(
        "Notfallkontakt: {} ({}) {}",
        notfall.name, notfall.beziehung, notfall.telefon
    );

    if !draft.note.is_empty() {
        println!("\n{}", draft.note);
    }

    println!("\nErklärungen:");
    for which in Confirmation::ALL {
        let mark = if draft.confirmations.get(which) { "x" } else { " " };
        println!("  [{}] {}", mark, which);
    }
}
