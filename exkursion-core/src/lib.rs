//! Exkursion Core Library
//!
//! Persisted state for the excursion registration wizard: the participant's
//! draft, the admin records it is submitted into, and the CSV export.

pub mod anmeldung_id;
pub mod clock;
pub mod draft;
pub mod error;
pub mod export;
pub mod migrate;
pub mod models;
pub mod records;
pub mod storage;

pub use anmeldung_id::generate_anmeldung_id;
pub use clock::{Clock, SystemClock};
pub use draft::RegistrationDraftStore;
pub use error::{
    DecodeError, StoreError, MSG_DRAFT_WITHOUT_EXCURSION, MSG_EXCURSION_ID_REQUIRED,
    MSG_EXCURSION_ID_TAKEN, MSG_HYDRATE_FAILED,
};
pub use export::{escape_cell, export_teilnehmer_csv};
pub use migrate::{AuthState, SCHEMA_VERSION};
pub use models::{
    Ausweisart, Confirmation, Confirmations, ConfirmationsPatch, Excursion, ExcursionInput,
    ExkursionPatch, ExkursionRef, Gruppenart, NotfallKontakt, NotfallPatch, Persoenlich,
    PersoenlichPatch, Reiseart, RegistrationDraft, SubmissionInput, Teilnehmer, TeilnehmerStatus,
};
pub use records::{expected_admin_token, RecordsStore, ADMIN_TOKEN_ENV, FALLBACK_ADMIN_TOKEN};
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
