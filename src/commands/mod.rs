mod admin;
mod config_cmd;
mod draft;
mod excursion;
mod teilnehmer;

pub use admin::AdminCommand;
pub use config_cmd::ConfigCommand;
pub use draft::DraftCommand;
pub use excursion::ExcursionCommand;
pub use teilnehmer::TeilnehmerCommand;

use clap::ValueEnum;
use exkursion_core::RecordsStore;
use std::io::{self, Write};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Hydrates the records and refuses to continue unless an admin is logged in.
pub fn require_admin(records: &mut RecordsStore) -> Result<(), Box<dyn std::error::Error>> {
    records.ensure_hydrated();
    if !records.is_authenticated() {
        return Err("Admin login required. Run 'exkursion admin login <token>' first.".into());
    }
    Ok(())
}

/// Asks a yes/no question on stdout; anything but `y` means no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Shortens `text` to `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Maps a `--x` / `--clear-x` flag pair onto a clearable patch field.
fn optional_selection<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}
