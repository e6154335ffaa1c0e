use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::confirmations::Confirmations;
use super::excursion::ExkursionRef;
use super::persoenlich::{NotfallKontakt, Persoenlich};

/// Review status of a submission. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeilnehmerStatus {
    #[default]
    Eingegangen,
    Bestaetigt,
    Abgelehnt,
}

impl fmt::Display for TeilnehmerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeilnehmerStatus::Eingegangen => write!(f, "eingegangen"),
            TeilnehmerStatus::Bestaetigt => write!(f, "bestaetigt"),
            TeilnehmerStatus::Abgelehnt => write!(f, "abgelehnt"),
        }
    }
}

impl FromStr for TeilnehmerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eingegangen" => Ok(TeilnehmerStatus::Eingegangen),
            "bestaetigt" | "bestätigt" => Ok(TeilnehmerStatus::Bestaetigt),
            "abgelehnt" => Ok(TeilnehmerStatus::Abgelehnt),
            _ => Err(format!(
                "Invalid status '{}'. Valid options: eingegangen, bestaetigt, abgelehnt",
                s
            )),
        }
    }
}

/// A recorded submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teilnehmer {
    pub id: String,
    pub exkursion_id: String,
    pub persoenlich: Persoenlich,
    pub notfall: NotfallKontakt,
    pub note: String,
    pub confirmations: Confirmations,
    pub status: TeilnehmerStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exkursion_snapshot: Option<ExkursionRef>,
}

impl fmt::Display for Teilnehmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.persoenlich.full_name();
        writeln!(f, "{} [{}]", if name.is_empty() { "-" } else { name.as_str() }, self.status)?;
        writeln!(f, "  ID: {}", self.id)?;

        match &self.exkursion_snapshot {
            Some(snapshot) if !snapshot.titel.is_empty() => {
                writeln!(f, "  Exkursion: {} ({})", snapshot.titel, self.exkursion_id)?;
            }
            _ => writeln!(f, "  Exkursion: {}", self.exkursion_id)?,
        }

        if !self.persoenlich.email.is_empty() {
            writeln!(f, "  E-Mail: {}", self.persoenlich.email)?;
        }
        writeln!(
            f,
            "  Eingegangen: {}",
            self.submitted_at.format("%Y-%m-%d %H:%M")
        )?;

        if !self.note.is_empty() {
            writeln!(f, "  Notiz: {}", self.note)?;
        }

        Ok(())
    }
}

/// Payload handed to `RecordsStore::record_submission`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionInput {
    pub id: String,
    pub exkursion_id: String,
    pub persoenlich: Persoenlich,
    pub notfall: NotfallKontakt,
    pub note: String,
    pub confirmations: Confirmations,
    pub status: Option<TeilnehmerStatus>,
    /// Kept as-is when given; otherwise the current time is used.
    pub submitted_at: Option<DateTime<Utc>>,
    pub exkursion_snapshot: Option<ExkursionRef>,
}
