use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the mandatory declarations, in checklist order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confirmation {
    Teilnahmebedingungen,
    Reisedokumente,
    Krankenversicherung,
    Gesundheit,
    Verhaltensregeln,
    Haftungsausschluss,
    Datenschutz,
}

impl Confirmation {
    /// All declarations in positional order.
    pub const ALL: [Confirmation; 7] = [
        Confirmation::Teilnahmebedingungen,
        Confirmation::Reisedokumente,
        Confirmation::Krankenversicherung,
        Confirmation::Gesundheit,
        Confirmation::Verhaltensregeln,
        Confirmation::Haftungsausschluss,
        Confirmation::Datenschutz,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Confirmation::Teilnahmebedingungen => "teilnahmebedingungen",
            Confirmation::Reisedokumente => "reisedokumente",
            Confirmation::Krankenversicherung => "krankenversicherung",
            Confirmation::Gesundheit => "gesundheit",
            Confirmation::Verhaltensregeln => "verhaltensregeln",
            Confirmation::Haftungsausschluss => "haftungsausschluss",
            Confirmation::Datenschutz => "datenschutz",
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Confirmation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Confirmation::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Confirmation::ALL.iter().map(|c| c.name()).collect();
                format!(
                    "Invalid confirmation '{}'. Valid options: {}",
                    s,
                    names.join(", ")
                )
            })
    }
}

/// The fixed set of consent declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Confirmations {
    pub teilnahmebedingungen: bool,
    pub reisedokumente: bool,
    pub krankenversicherung: bool,
    pub gesundheit: bool,
    pub verhaltensregeln: bool,
    pub haftungsausschluss: bool,
    pub datenschutz: bool,
}

impl Confirmations {
    pub fn get(&self, which: Confirmation) -> bool {
        *self.flag(which)
    }

    pub fn set(&mut self, which: Confirmation, value: bool) {
        *self.flag_mut(which) = value;
    }

    pub fn all_confirmed(&self) -> bool {
        Confirmation::ALL.iter().all(|c| self.get(*c))
    }

    /// Declarations not yet given, in checklist order.
    pub fn missing(&self) -> Vec<Confirmation> {
        Confirmation::ALL
            .into_iter()
            .filter(|c| !self.get(*c))
            .collect()
    }

    pub fn apply(&mut self, patch: ConfirmationsPatch) {
        for (which, value) in patch.entries {
            self.set(which, value);
        }
    }

    fn flag(&self, which: Confirmation) -> &bool {
        match which {
            Confirmation::Teilnahmebedingungen => &self.teilnahmebedingungen,
            Confirmation::Reisedokumente => &self.reisedokumente,
            Confirmation::Krankenversicherung => &self.krankenversicherung,
            Confirmation::Gesundheit => &self.gesundheit,
            Confirmation::Verhaltensregeln => &self.verhaltensregeln,
            Confirmation::Haftungsausschluss => &self.haftungsausschluss,
            Confirmation::Datenschutz => &self.datenschutz,
        }
    }

    fn flag_mut(&mut self, which: Confirmation) -> &mut bool {
        match which {
            Confirmation::Teilnahmebedingungen => &mut self.teilnahmebedingungen,
            Confirmation::Reisedokumente => &mut self.reisedokumente,
            Confirmation::Krankenversicherung => &mut self.krankenversicherung,
            Confirmation::Gesundheit => &mut self.gesundheit,
            Confirmation::Verhaltensregeln => &mut self.verhaltensregeln,
            Confirmation::Haftungsausschluss => &mut self.haftungsausschluss,
            Confirmation::Datenschutz => &mut self.datenschutz,
        }
    }
}

/// Partial update for [`Confirmations`].
#[derive(Debug, Clone, Default)]
pub struct ConfirmationsPatch {
    entries: Vec<(Confirmation, bool)>,
}

impl ConfirmationsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, which: Confirmation, value: bool) -> Self {
        self.entries.push((which, value));
        self
    }
}

/// Positional checklist used before the declarations were named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct LegacyChecklist {
    pub check1: bool,
    pub check2: bool,
    pub check3: bool,
    pub check4: bool,
    pub check5: bool,
    pub check6: bool,
    pub check7: bool,
}

impl LegacyChecklist {
    /// Flags in positional order.
    pub fn flags(&self) -> [bool; 7] {
        [
            self.check1,
            self.check2,
            self.check3,
            self.check4,
            self.check5,
            self.check6,
            self.check7,
        ]
    }
}
