//! The wizard's in-progress registration and its hand-off to the records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::anmeldung_id::generate_anmeldung_id;
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, MSG_DRAFT_WITHOUT_EXCURSION};
use crate::migrate::{encode_draft, migrate_draft};
use crate::models::{
    Confirmation, ConfirmationsPatch, ExkursionPatch, NotfallPatch, PersoenlichPatch,
    RegistrationDraft, SubmissionInput,
};
use crate::records::RecordsStore;
use crate::storage::{LocalStorage, DRAFT_STORAGE_KEY};

/// Owns one [`RegistrationDraft`] and keeps it persisted under
/// `anmeldung-store` after every change.
pub struct RegistrationDraftStore {
    storage: Arc<dyn LocalStorage>,
    clock: Arc<dyn Clock>,
    draft: RegistrationDraft,
}

impl std::fmt::Debug for RegistrationDraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationDraftStore")
            .field("draft", &self.draft)
            .finish()
    }
}

impl RegistrationDraftStore {
    /// Restores the persisted draft, or starts a blank one.
    ///
    /// Unreadable or undecodable data is logged and replaced by defaults.
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        Self::load_with_clock(storage, Arc::new(SystemClock))
    }

    pub fn load_with_clock(storage: Arc<dyn LocalStorage>, clock: Arc<dyn Clock>) -> Self {
        let draft = Self::read_draft(storage.as_ref());
        Self {
            storage,
            clock,
            draft,
        }
    }

    fn read_draft(storage: &dyn LocalStorage) -> RegistrationDraft {
        let defaults = RegistrationDraft::new();

        let raw = match storage.get_item(DRAFT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return defaults,
            Err(e) => {
                tracing::warn!("Failed to read persisted draft: {}", e);
                return defaults;
            }
        };

        match migrate_draft(&raw, defaults.clone()) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!("Discarding undecodable draft: {}", e);
                defaults
            }
        }
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    // ==================== Field setters ====================

    pub fn set_exkursion(&mut self, patch: ExkursionPatch) -> Result<(), StoreError> {
        self.draft.exkursion.apply(patch);
        self.touch_draft()
    }

    pub fn set_persoenlich(&mut self, patch: PersoenlichPatch) -> Result<(), StoreError> {
        self.draft.persoenlich.apply(patch);
        self.touch_draft()
    }

    pub fn set_notfall(&mut self, patch: NotfallPatch) -> Result<(), StoreError> {
        self.draft.notfall.apply(patch);
        self.touch_draft()
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> Result<(), StoreError> {
        self.draft.note = note.into();
        self.touch_draft()
    }

    pub fn set_confirmations(&mut self, patch: ConfirmationsPatch) -> Result<(), StoreError> {
        self.draft.confirmations.apply(patch);
        self.touch_draft()
    }

    /// Marks the draft as changed since the last submit and persists it.
    pub fn touch_draft(&mut self) -> Result<(), StoreError> {
        self.draft.submitted_at = None;
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let raw = encode_draft(&self.draft)?;
        self.storage.set_item(DRAFT_STORAGE_KEY, &raw)?;
        tracing::debug!("Persisted draft {}", self.draft.anmeldung_id);
        Ok(())
    }

    // ==================== Lifecycle ====================

    /// Assigns an identifier if the draft has none.
    pub fn ensure_id(&mut self) {
        if self.draft.anmeldung_id.trim().is_empty() {
            self.draft.anmeldung_id = generate_anmeldung_id();
        }
    }

    /// Starts over with a blank draft and erases the persisted one.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.draft = RegistrationDraft::new();
        self.storage.remove_item(DRAFT_STORAGE_KEY)?;
        tracing::debug!("Draft reset, new id {}", self.draft.anmeldung_id);
        Ok(())
    }

    /// Records the draft as a submission and stamps `submitted_at`.
    ///
    /// Fails without touching either store if no excursion is selected.
    /// Submitting again reuses the identifier, so the earlier record is
    /// replaced rather than duplicated.
    pub fn submit(&mut self, records: &mut RecordsStore) -> Result<(), StoreError> {
        let exkursion_id = self.draft.exkursion.id.trim().to_string();
        if exkursion_id.is_empty() {
            return Err(StoreError::validation(MSG_DRAFT_WITHOUT_EXCURSION));
        }

        self.ensure_id();

        let payload = SubmissionInput {
            id: self.draft.anmeldung_id.clone(),
            exkursion_id,
            persoenlich: self.draft.persoenlich.clone(),
            notfall: self.draft.notfall.clone(),
            note: self.draft.note.clone(),
            confirmations: self.draft.confirmations,
            status: None,
            submitted_at: None,
            exkursion_snapshot: Some(self.draft.exkursion.clone()),
        };
        records.record_submission(payload)?;

        self.draft.submitted_at = Some(self.clock.now());
        self.persist()?;
        tracing::info!("Submitted registration {}", self.draft.anmeldung_id);
        Ok(())
    }

    // ==================== Derived values ====================

    pub fn full_name(&self) -> String {
        self.draft.full_name()
    }

    pub fn is_complete(&self) -> bool {
        self.draft.is_complete()
    }

    pub fn is_submitted(&self) -> bool {
        self.draft.is_submitted()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.draft.submitted_at
    }

    /// Declarations still to be given, in checklist order.
    pub fn missing_confirmations(&self) -> Vec<Confirmation> {
        self.draft.confirmations.missing()
    }
}
