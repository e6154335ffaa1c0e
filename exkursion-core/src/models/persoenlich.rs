use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity document presented for the trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ausweisart {
    Reisepass,
    #[default]
    Personalausweis,
}

impl Ausweisart {
    pub fn label(&self) -> &'static str {
        match self {
            Ausweisart::Reisepass => "Reisepass",
            Ausweisart::Personalausweis => "Personalausweis",
        }
    }
}

impl fmt::Display for Ausweisart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Ausweisart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reisepass" | "pass" => Ok(Ausweisart::Reisepass),
            "personalausweis" | "ausweis" => Ok(Ausweisart::Personalausweis),
            _ => Err(format!(
                "Invalid Ausweisart '{}'. Valid options: Reisepass, Personalausweis",
                s
            )),
        }
    }
}

/// How the participant travels to the excursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reiseart {
    Auto,
    Bus,
    Flugzeug,
    Zug,
    #[serde(rename = "Noch nicht festgelegt/Sonstige")]
    Sonstige,
}

impl Reiseart {
    pub fn label(&self) -> &'static str {
        match self {
            Reiseart::Auto => "Auto",
            Reiseart::Bus => "Bus",
            Reiseart::Flugzeug => "Flugzeug",
            Reiseart::Zug => "Zug",
            Reiseart::Sonstige => "Noch nicht festgelegt/Sonstige",
        }
    }
}

impl fmt::Display for Reiseart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Reiseart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Reiseart::Auto),
            "bus" => Ok(Reiseart::Bus),
            "flugzeug" => Ok(Reiseart::Flugzeug),
            "zug" => Ok(Reiseart::Zug),
            "sonstige" | "noch nicht festgelegt/sonstige" => Ok(Reiseart::Sonstige),
            _ => Err(format!(
                "Invalid Reiseart '{}'. Valid options: auto, bus, flugzeug, zug, sonstige",
                s
            )),
        }
    }
}

/// Whether the participant travels alone or with partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gruppenart {
    Alleine,
    #[serde(rename = "Mit einem oder mehreren Partnern")]
    MitPartnern,
    #[serde(rename = "-")]
    Keine,
}

impl Gruppenart {
    pub fn label(&self) -> &'static str {
        match self {
            Gruppenart::Alleine => "Alleine",
            Gruppenart::MitPartnern => "Mit einem oder mehreren Partnern",
            Gruppenart::Keine => "-",
        }
    }
}

impl fmt::Display for Gruppenart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gruppenart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alleine" => Ok(Gruppenart::Alleine),
            "partner" | "mit einem oder mehreren partnern" => Ok(Gruppenart::MitPartnern),
            "-" | "keine" => Ok(Gruppenart::Keine),
            _ => Err(format!(
                "Invalid Gruppenart '{}'. Valid options: alleine, partner, keine",
                s
            )),
        }
    }
}

/// Personal details collected from each participant.
///
/// Missing fields in persisted data take their default values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Persoenlich {
    pub vorname: String,
    pub nachname: String,
    pub ausweisart: Ausweisart,
    pub ausweisnr: String,
    pub handy: String,
    pub email: String,
    pub matrikelnr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reiseart: Option<Reiseart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gruppe: Option<Gruppenart>,
}

impl Persoenlich {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.vorname, self.nachname)
            .trim()
            .to_string()
    }

    /// Shallow merge: every field set in `patch` overwrites the current value.
    pub fn apply(&mut self, patch: PersoenlichPatch) {
        if let Some(vorname) = patch.vorname {
            self.vorname = vorname;
        }
        if let Some(nachname) = patch.nachname {
            self.nachname = nachname;
        }
        if let Some(ausweisart) = patch.ausweisart {
            self.ausweisart = ausweisart;
        }
        if let Some(ausweisnr) = patch.ausweisnr {
            self.ausweisnr = ausweisnr;
        }
        if let Some(handy) = patch.handy {
            self.handy = handy;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(matrikelnr) = patch.matrikelnr {
            self.matrikelnr = matrikelnr;
        }
        if let Some(reiseart) = patch.reiseart {
            self.reiseart = reiseart;
        }
        if let Some(gruppe) = patch.gruppe {
            self.gruppe = gruppe;
        }
    }
}

/// Partial update for [`Persoenlich`].
///
/// `reiseart` and `gruppe` take `Some(None)` to clear the selection.
#[derive(Debug, Clone, Default)]
pub struct PersoenlichPatch {
    pub vorname: Option<String>,
    pub nachname: Option<String>,
    pub ausweisart: Option<Ausweisart>,
    pub ausweisnr: Option<String>,
    pub handy: Option<String>,
    pub email: Option<String>,
    pub matrikelnr: Option<String>,
    pub reiseart: Option<Option<Reiseart>>,
    pub gruppe: Option<Option<Gruppenart>>,
}

/// Emergency contact requested alongside the registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotfallKontakt {
    pub name: String,
    pub beziehung: String,
    pub telefon: String,
}

impl NotfallKontakt {
    pub fn apply(&mut self, patch: NotfallPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(beziehung) = patch.beziehung {
            self.beziehung = beziehung;
        }
        if let Some(telefon) = patch.telefon {
            self.telefon = telefon;
        }
    }
}

/// Partial update for [`NotfallKontakt`].
#[derive(Debug, Clone, Default)]
pub struct NotfallPatch {
    pub name: Option<String>,
    pub beziehung: Option<String>,
    pub telefon: Option<String>,
}
