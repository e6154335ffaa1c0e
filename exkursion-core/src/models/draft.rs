use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confirmations::Confirmations;
use super::excursion::ExkursionRef;
use super::persoenlich::{NotfallKontakt, Persoenlich};
use crate::anmeldung_id::generate_anmeldung_id;

/// The in-progress registration held by the wizard.
///
/// `submitted_at` is set only by a successful submit and cleared by any
/// later field change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    pub anmeldung_id: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub exkursion: ExkursionRef,
    pub persoenlich: Persoenlich,
    pub notfall: NotfallKontakt,
    pub note: String,
    pub confirmations: Confirmations,
}

impl RegistrationDraft {
    /// A blank draft with a freshly generated identifier.
    pub fn new() -> Self {
        Self {
            anmeldung_id: generate_anmeldung_id(),
            submitted_at: None,
            exkursion: ExkursionRef::default(),
            persoenlich: Persoenlich::default(),
            notfall: NotfallKontakt::default(),
            note: String::new(),
            confirmations: Confirmations::default(),
        }
    }

    pub fn full_name(&self) -> String {
        self.persoenlich.full_name()
    }

    /// True once an excursion is chosen and the mandatory identity and
    /// emergency-contact fields are filled.
    pub fn is_complete(&self) -> bool {
        !self.exkursion.id.is_empty()
            && !self.persoenlich.vorname.is_empty()
            && !self.persoenlich.nachname.is_empty()
            && !self.persoenlich.email.is_empty()
            && !self.persoenlich.matrikelnr.is_empty()
            && !self.notfall.name.is_empty()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }
}

impl Default for RegistrationDraft {
    fn default() -> Self {
        Self::new()
    }
}
