use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal excursion data held by the wizard and embedded in submissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExkursionRef {
    pub id: String,
    pub titel: String,
    pub datum: String,
    pub ort: String,
}

impl ExkursionRef {
    pub fn apply(&mut self, patch: ExkursionPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(titel) = patch.titel {
            self.titel = titel;
        }
        if let Some(datum) = patch.datum {
            self.datum = datum;
        }
        if let Some(ort) = patch.ort {
            self.ort = ort;
        }
    }
}

/// Partial update for [`ExkursionRef`].
#[derive(Debug, Clone, Default)]
pub struct ExkursionPatch {
    pub id: Option<String>,
    pub titel: Option<String>,
    pub datum: Option<String>,
    pub ort: Option<String>,
}

impl From<ExkursionRef> for ExkursionPatch {
    fn from(selection: ExkursionRef) -> Self {
        Self {
            id: Some(selection.id),
            titel: Some(selection.titel),
            datum: Some(selection.datum),
            ort: Some(selection.ort),
        }
    }
}

/// An offered excursion as managed by the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Excursion {
    pub id: String,
    pub titel: String,
    pub datum: String,
    pub ort: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beschreibung: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kapazitaet: Option<u32>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Excursion {
    /// Point-in-time copy for embedding in a submission.
    pub fn snapshot(&self) -> ExkursionRef {
        ExkursionRef {
            id: self.id.clone(),
            titel: self.titel.clone(),
            datum: self.datum.clone(),
            ort: self.ort.clone(),
        }
    }

    /// Option label shown in the wizard's excursion picker.
    pub fn label(&self) -> String {
        let id = if self.id.is_empty() {
            "ohne ID"
        } else {
            self.id.as_str()
        };
        format!("{} ({})", self.titel, id)
    }
}

impl fmt::Display for Excursion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.titel)?;
        writeln!(f, "{}", "=".repeat(self.titel.chars().count()))?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Datum: {}", self.datum)?;
        writeln!(f, "Ort: {}", self.ort)?;

        if let Some(kapazitaet) = self.kapazitaet {
            writeln!(f, "Kapazität: {}", kapazitaet)?;
        }
        if self.archived {
            writeln!(f, "Archiviert")?;
        }
        if let Some(beschreibung) = &self.beschreibung {
            writeln!(f, "\n{}", beschreibung)?;
        }

        Ok(())
    }
}

/// Payload for creating or updating an excursion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExcursionInput {
    pub id: String,
    pub titel: String,
    pub datum: String,
    pub ort: String,
    pub beschreibung: Option<String>,
    /// Non-positive values are stored as absent.
    pub kapazitaet: Option<i64>,
    /// `None` keeps the current flag on update and means `false` on insert.
    pub archived: Option<bool>,
}

impl ExcursionInput {
    pub fn new(
        id: impl Into<String>,
        titel: impl Into<String>,
        datum: impl Into<String>,
        ort: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            titel: titel.into(),
            datum: datum.into(),
            ort: ort.into(),
            ..Default::default()
        }
    }

    pub fn with_beschreibung(mut self, beschreibung: impl Into<String>) -> Self {
        self.beschreibung = Some(beschreibung.into());
        self
    }

    pub fn with_kapazitaet(mut self, kapazitaet: i64) -> Self {
        self.kapazitaet = Some(kapazitaet);
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}

/// Trims string fields and drops empty or non-positive optional fields.
pub(crate) fn sanitize_excursion(excursion: &mut Excursion) {
    excursion.id = excursion.id.trim().to_string();
    excursion.titel = excursion.titel.trim().to_string();
    excursion.datum = excursion.datum.trim().to_string();
    excursion.ort = excursion.ort.trim().to_string();
    excursion.beschreibung = normalize_text(excursion.beschreibung.take());
}

pub(crate) fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub(crate) fn normalize_kapazitaet(value: Option<i64>) -> Option<u32> {
    value
        .filter(|k| *k > 0)
        .map(|k| u32::try_from(k).unwrap_or(u32::MAX))
}
