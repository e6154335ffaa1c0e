mod confirmations;
mod draft;
mod excursion;
mod persoenlich;
mod teilnehmer;

pub use confirmations::{Confirmation, Confirmations, ConfirmationsPatch, LegacyChecklist};
pub use draft::RegistrationDraft;
pub use excursion::{Excursion, ExcursionInput, ExkursionPatch, ExkursionRef};
pub use persoenlich::{
    Ausweisart, Gruppenart, NotfallKontakt, NotfallPatch, Persoenlich, PersoenlichPatch, Reiseart,
};
pub use teilnehmer::{SubmissionInput, Teilnehmer, TeilnehmerStatus};

pub(crate) use excursion::{normalize_kapazitaet, normalize_text, sanitize_excursion};
