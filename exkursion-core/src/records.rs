//! Admin-side records: excursions, recorded submissions and the admin flag.
//!
//! # Persistence
//!
//! The store owns two storage keys:
//!
//! ```text
//! admin-auth   { schemaVersion, isAuthenticated, authToken }
//! admin-data   { schemaVersion, excursions: [...], teilnehmer: [...] }
//! ```
//!
//! Every successful mutation rewrites the affected key with a fresh
//! serialization of the in-memory state.
//!
//! # Hydration
//!
//! Nothing is read until [`RecordsStore::hydrate`] runs. Every mutation calls
//! [`RecordsStore::ensure_hydrated`] first; readers are expected to do the
//! same before looking at the collections. Undecodable data never fails
//! hydration: the store starts empty and exposes an advisory message via
//! [`RecordsStore::error`].

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::{
    StoreError, MSG_EXCURSION_ID_REQUIRED, MSG_EXCURSION_ID_TAKEN, MSG_HYDRATE_FAILED,
};
use crate::export::export_teilnehmer_csv;
use crate::migrate::{decode_auth, encode_auth, encode_records, migrate_records, AuthState};
use crate::models::{
    normalize_kapazitaet, sanitize_excursion, Excursion, ExcursionInput, SubmissionInput,
    Teilnehmer, TeilnehmerStatus,
};
use crate::storage::{LocalStorage, AUTH_STORAGE_KEY, DATA_STORAGE_KEY};

/// Environment variable holding the expected admin token.
pub const ADMIN_TOKEN_ENV: &str = "EXKURSION_ADMIN_TOKEN";

/// Token accepted when no token is configured.
pub const FALLBACK_ADMIN_TOKEN: &str = "hallo-admin";

/// Expected admin token: `EXKURSION_ADMIN_TOKEN` if set and non-blank,
/// otherwise the fallback.
pub fn expected_admin_token() -> String {
    std::env::var(ADMIN_TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ADMIN_TOKEN.to_string())
}

/// Durable store of excursions and submissions.
pub struct RecordsStore {
    storage: Arc<dyn LocalStorage>,
    clock: Arc<dyn Clock>,
    expected_token: String,
    excursions: Vec<Excursion>,
    teilnehmer: Vec<Teilnehmer>,
    auth: AuthState,
    hydrated: bool,
    error: Option<String>,
}

impl std::fmt::Debug for RecordsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordsStore")
            .field("excursions", &self.excursions.len())
            .field("teilnehmer", &self.teilnehmer.len())
            .field("is_authenticated", &self.auth.is_authenticated)
            .field("hydrated", &self.hydrated)
            .field("error", &self.error)
            .finish()
    }
}

impl RecordsStore {
    /// Creates an unhydrated store over `storage`.
    ///
    /// A blank `expected_token` is replaced by [`FALLBACK_ADMIN_TOKEN`].
    pub fn new(storage: Arc<dyn LocalStorage>, expected_token: impl Into<String>) -> Self {
        let mut expected_token = expected_token.into();
        if expected_token.trim().is_empty() {
            expected_token = FALLBACK_ADMIN_TOKEN.to_string();
        }

        Self {
            storage,
            clock: Arc::new(SystemClock),
            expected_token,
            excursions: Vec::new(),
            teilnehmer: Vec::new(),
            auth: AuthState::default(),
            hydrated: false,
            error: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ==================== Hydration ====================

    /// Loads auth and records from storage. Runs once; later calls are no-ops.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        match self.read_auth() {
            Ok(auth) => self.auth = auth,
            Err(e) => {
                tracing::error!("Failed to load persisted admin auth: {}", e);
                self.auth = AuthState::default();
                self.error = Some(MSG_HYDRATE_FAILED.to_string());
            }
        }

        match self.read_records() {
            Ok((excursions, teilnehmer)) => {
                tracing::info!(
                    "Loaded {} excursion(s) and {} teilnehmer",
                    excursions.len(),
                    teilnehmer.len()
                );
                self.excursions = excursions;
                self.teilnehmer = teilnehmer;
            }
            Err(e) => {
                tracing::error!("Failed to load persisted admin data: {}", e);
                self.excursions.clear();
                self.teilnehmer.clear();
                self.error = Some(MSG_HYDRATE_FAILED.to_string());
            }
        }

        self.hydrated = true;
    }

    /// Hydrates if that has not happened yet.
    pub fn ensure_hydrated(&mut self) {
        if !self.hydrated {
            self.hydrate();
        }
    }

    fn read_auth(&self) -> Result<AuthState, Box<dyn std::error::Error>> {
        match self.storage.get_item(AUTH_STORAGE_KEY)? {
            Some(raw) => Ok(decode_auth(&raw)?),
            None => Ok(AuthState::default()),
        }
    }

    fn read_records(
        &self,
    ) -> Result<(Vec<Excursion>, Vec<Teilnehmer>), Box<dyn std::error::Error>> {
        match self.storage.get_item(DATA_STORAGE_KEY)? {
            Some(raw) => Ok(migrate_records(&raw, self.clock.now())?),
            None => Ok((Vec::new(), Vec::new())),
        }
    }

    // ==================== Persistence ====================

    fn persist_auth(&self) -> Result<(), StoreError> {
        let raw = encode_auth(&self.auth)?;
        self.storage.set_item(AUTH_STORAGE_KEY, &raw)?;
        Ok(())
    }

    fn persist_data(&self) -> Result<(), StoreError> {
        let raw = encode_records(&self.excursions, &self.teilnehmer)?;
        self.storage.set_item(DATA_STORAGE_KEY, &raw)?;
        tracing::debug!(
            "Persisted {} excursion(s) and {} teilnehmer",
            self.excursions.len(),
            self.teilnehmer.len()
        );
        Ok(())
    }

    // ==================== Accessors ====================

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Advisory message from a failed hydration, for the UI to surface.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated
    }

    pub fn auth_token(&self) -> &str {
        &self.auth.auth_token
    }

    pub fn excursions(&self) -> &[Excursion] {
        &self.excursions
    }

    pub fn has_excursions(&self) -> bool {
        !self.excursions.is_empty()
    }

    pub fn excursion_by_id(&self, id: &str) -> Option<&Excursion> {
        self.excursions.iter().find(|e| e.id == id)
    }

    /// Excursions open for registration, in collection order.
    pub fn active_excursions(&self) -> impl Iterator<Item = &Excursion> {
        self.excursions.iter().filter(|e| !e.archived)
    }

    pub fn teilnehmer(&self) -> &[Teilnehmer] {
        &self.teilnehmer
    }

    pub fn teilnehmer_by_id(&self, id: &str) -> Option<&Teilnehmer> {
        self.teilnehmer.iter().find(|t| t.id == id)
    }

    /// Submissions for one excursion, or all of them when `excursion_id` is
    /// `None` or blank.
    pub fn teilnehmer_by_excursion(&self, excursion_id: Option<&str>) -> Vec<&Teilnehmer> {
        let excursion_id = excursion_id.filter(|id| !id.trim().is_empty());
        self.teilnehmer
            .iter()
            .filter(|t| excursion_id.map_or(true, |id| t.exkursion_id == id))
            .collect()
    }

    // ==================== Authentication ====================

    /// Compares the trimmed candidate against the expected token.
    ///
    /// The outcome is persisted either way; `Ok(false)` means rejected.
    pub fn login(&mut self, candidate: &str) -> Result<bool, StoreError> {
        self.ensure_hydrated();

        let accepted = candidate.trim() == self.expected_token.trim();
        if accepted {
            self.auth = AuthState {
                is_authenticated: true,
                auth_token: candidate.to_string(),
            };
            tracing::info!("Admin login accepted");
        } else {
            self.auth = AuthState::default();
            tracing::info!("Admin login rejected");
        }

        self.persist_auth()?;
        Ok(accepted)
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.ensure_hydrated();
        self.auth = AuthState::default();
        self.persist_auth()
    }

    // ==================== Excursions ====================

    /// Creates or updates an excursion.
    ///
    /// The record to update is found by `original_id` if given, else by
    /// `input.id`, which allows renaming in place. Fails without writing
    /// anything if the ID is blank or already owned by another excursion.
    pub fn upsert_excursion(
        &mut self,
        input: ExcursionInput,
        original_id: Option<&str>,
    ) -> Result<&Excursion, StoreError> {
        self.ensure_hydrated();

        let new_id = input.id.trim().to_string();
        if new_id.is_empty() {
            return Err(StoreError::validation(MSG_EXCURSION_ID_REQUIRED));
        }

        let match_id = original_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(new_id.as_str())
            .to_string();

        let existing = self.excursions.iter().position(|e| e.id == match_id);
        let conflict = self
            .excursions
            .iter()
            .position(|e| e.id == new_id && e.id != match_id);
        if conflict.is_some() {
            return Err(StoreError::conflict(MSG_EXCURSION_ID_TAKEN));
        }

        let now = self.clock.now();
        let index = match existing {
            Some(index) => {
                let previous = &self.excursions[index];
                let mut updated = Excursion {
                    id: new_id,
                    titel: input.titel,
                    datum: input.datum,
                    ort: input.ort,
                    beschreibung: input.beschreibung,
                    kapazitaet: normalize_kapazitaet(input.kapazitaet),
                    archived: input.archived.unwrap_or(previous.archived),
                    created_at: previous.created_at,
                    updated_at: now,
                };
                sanitize_excursion(&mut updated);
                self.excursions[index] = updated;
                index
            }
            None => {
                let mut created = Excursion {
                    id: new_id,
                    titel: input.titel,
                    datum: input.datum,
                    ort: input.ort,
                    beschreibung: input.beschreibung,
                    kapazitaet: normalize_kapazitaet(input.kapazitaet),
                    archived: input.archived.unwrap_or(false),
                    created_at: now,
                    updated_at: now,
                };
                sanitize_excursion(&mut created);
                self.excursions.push(created);
                self.excursions.len() - 1
            }
        };

        self.persist_data()?;
        Ok(&self.excursions[index])
    }

    /// Sets the archived flag. Returns `false` if no such excursion exists.
    pub fn toggle_archive(&mut self, id: &str, archived: bool) -> Result<bool, StoreError> {
        self.ensure_hydrated();

        let now = self.clock.now();
        let Some(target) = self.excursions.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        target.archived = archived;
        target.updated_at = now;

        self.persist_data()?;
        Ok(true)
    }

    /// Removes an excursion. Submissions referencing it are kept.
    pub fn delete_excursion(&mut self, id: &str) -> Result<bool, StoreError> {
        self.ensure_hydrated();

        let Some(index) = self.excursions.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        self.excursions.remove(index);

        self.persist_data()?;
        Ok(true)
    }

    // ==================== Teilnehmer ====================

    /// Records a submission, replacing an existing one with the same ID in
    /// place or appending a new one.
    pub fn record_submission(&mut self, input: SubmissionInput) -> Result<&Teilnehmer, StoreError> {
        self.ensure_hydrated();

        let now = self.clock.now();
        let exkursion_snapshot = input.exkursion_snapshot.or_else(|| {
            self.excursion_by_id(&input.exkursion_id)
                .map(Excursion::snapshot)
        });

        let record = Teilnehmer {
            id: input.id,
            exkursion_id: input.exkursion_id,
            persoenlich: input.persoenlich,
            notfall: input.notfall,
            note: input.note,
            confirmations: input.confirmations,
            status: input.status.unwrap_or_default(),
            submitted_at: input.submitted_at.unwrap_or(now),
            updated_at: now,
            exkursion_snapshot,
        };

        let index = match self.teilnehmer.iter().position(|t| t.id == record.id) {
            Some(index) => {
                tracing::debug!("Replacing submission {}", record.id);
                self.teilnehmer[index] = record;
                index
            }
            None => {
                tracing::debug!("Recording new submission {}", record.id);
                self.teilnehmer.push(record);
                self.teilnehmer.len() - 1
            }
        };

        self.persist_data()?;
        Ok(&self.teilnehmer[index])
    }

    /// Sets a submission's status. Returns `false` if no such submission exists.
    pub fn update_status(&mut self, id: &str, status: TeilnehmerStatus) -> Result<bool, StoreError> {
        self.ensure_hydrated();

        let now = self.clock.now();
        let Some(target) = self.teilnehmer.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        target.status = status;
        target.updated_at = now;

        self.persist_data()?;
        Ok(true)
    }

    pub fn delete_teilnehmer(&mut self, id: &str) -> Result<bool, StoreError> {
        self.ensure_hydrated();

        let Some(index) = self.teilnehmer.iter().position(|t| t.id == id) else {
            return Ok(false);
        };
        self.teilnehmer.remove(index);

        self.persist_data()?;
        Ok(true)
    }

    // ==================== Export ====================

    /// CSV of the submissions, optionally limited to one excursion.
    /// Hydrates first.
    pub fn export_csv(&mut self, excursion_id: Option<&str>) -> String {
        self.ensure_hydrated();
        export_teilnehmer_csv(&self.teilnehmer, &self.excursions, excursion_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::export::BOM;
    use crate::models::{Confirmations, ExkursionRef, NotfallKontakt, Persoenlich};
    use crate::storage::MemoryStorage;

    fn test_store() -> (RecordsStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordsStore::new(storage.clone(), "geheim")
            .with_clock(Arc::new(SteppingClock::starting_at("2025-05-01T08:00:00Z")));
        (store, storage)
    }

    fn reopen(storage: &Arc<MemoryStorage>) -> RecordsStore {
        let mut store = RecordsStore::new(storage.clone(), "geheim");
        store.hydrate();
        store
    }

    fn alpine() -> ExcursionInput {
        ExcursionInput::new("E1", "Alpine Trip", "2025-06-01", "Zermatt")
    }

    fn submission(id: &str, exkursion_id: &str, vorname: &str) -> SubmissionInput {
        SubmissionInput {
            id: id.into(),
            exkursion_id: exkursion_id.into(),
            persoenlich: Persoenlich {
                vorname: vorname.into(),
                nachname: "Lovelace".into(),
                ..Default::default()
            },
            notfall: NotfallKontakt::default(),
            note: String::new(),
            confirmations: Confirmations::default(),
            ..Default::default()
        }
    }

    #[test]
    fn test_expected_admin_token_is_never_blank() {
        let token = expected_admin_token();
        assert!(!token.trim().is_empty());
        if std::env::var(ADMIN_TOKEN_ENV).is_err() {
            assert_eq!(token, FALLBACK_ADMIN_TOKEN);
        }
    }

    #[test]
    fn test_hydrate_empty_storage() {
        let (mut store, _storage) = test_store();
        assert!(!store.is_hydrated());

        store.hydrate();

        assert!(store.is_hydrated());
        assert!(store.error().is_none());
        assert!(!store.has_excursions());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let (mut store, storage) = test_store();
        store.hydrate();

        storage
            .set_item(DATA_STORAGE_KEY, r#"{"excursions":[{"id":"LATE"}]}"#)
            .unwrap();
        store.hydrate();

        assert!(store.excursion_by_id("LATE").is_none());
    }

    #[test]
    fn test_hydrate_corrupt_data_fails_open() {
        let (mut store, storage) = test_store();
        storage.set_item(DATA_STORAGE_KEY, "{kaputt").unwrap();

        store.hydrate();

        assert!(store.is_hydrated());
        assert_eq!(store.error(), Some(MSG_HYDRATE_FAILED));
        assert!(store.excursions().is_empty());
        assert!(store.teilnehmer().is_empty());
    }

    #[test]
    fn test_hydrate_corrupt_auth_keeps_data() {
        let (mut store, storage) = test_store();
        storage.set_item(AUTH_STORAGE_KEY, "[]").unwrap();
        storage
            .set_item(DATA_STORAGE_KEY, r#"{"excursions":[{"id":"E1","titel":"Alpine Trip"}]}"#)
            .unwrap();

        store.hydrate();

        assert_eq!(store.error(), Some(MSG_HYDRATE_FAILED));
        assert!(!store.is_authenticated());
        assert_eq!(store.excursions().len(), 1);
    }

    #[test]
    fn test_mutation_hydrates_first() {
        let (mut store, storage) = test_store();
        storage
            .set_item(DATA_STORAGE_KEY, r#"{"excursions":[{"id":"E0","titel":"Harz"}]}"#)
            .unwrap();

        store.upsert_excursion(alpine(), None).unwrap();

        assert!(store.is_hydrated());
        let ids: Vec<&str> = store.excursions().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["E0", "E1"]);
    }

    #[test]
    fn test_login_accepts_trimmed_token() {
        let (mut store, storage) = test_store();

        assert!(store.login("  geheim ").unwrap());
        assert!(store.is_authenticated());
        assert!(reopen(&storage).is_authenticated());
    }

    #[test]
    fn test_login_rejects_and_persists_logout() {
        let (mut store, storage) = test_store();
        store.login("geheim").unwrap();

        assert!(!store.login("falsch").unwrap());
        assert!(!store.is_authenticated());
        assert_eq!(store.auth_token(), "");

        let reopened = reopen(&storage);
        assert!(!reopened.is_authenticated());
    }

    #[test]
    fn test_blank_expected_token_falls_back() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = RecordsStore::new(storage, "  ");

        assert!(!store.login("").unwrap());
        assert!(!store.login("   ").unwrap());
        assert!(store.login(FALLBACK_ADMIN_TOKEN).unwrap());
    }

    #[test]
    fn test_logout() {
        let (mut store, storage) = test_store();
        store.login("geheim").unwrap();
        store.logout().unwrap();

        assert!(!store.is_authenticated());
        assert!(!reopen(&storage).is_authenticated());
    }

    #[test]
    fn test_upsert_inserts_sanitized() {
        let (mut store, _storage) = test_store();
        let input = ExcursionInput::new("  E1 ", " Alpine Trip ", "2025-06-01 ", "Zermatt")
            .with_beschreibung("  ")
            .with_kapazitaet(-5);

        let created = store.upsert_excursion(input, None).unwrap().clone();

        assert_eq!(created.id, "E1");
        assert_eq!(created.titel, "Alpine Trip");
        assert_eq!(created.datum, "2025-06-01");
        assert_eq!(created.beschreibung, None);
        assert_eq!(created.kapazitaet, None);
        assert!(!created.archived);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(store.excursion_by_id("E1"), Some(&created));
    }

    #[test]
    fn test_upsert_update_preserves_created_at() {
        let (mut store, _storage) = test_store();
        let first = store.upsert_excursion(alpine(), None).unwrap().clone();

        let second = store
            .upsert_excursion(alpine().with_kapazitaet(12), None)
            .unwrap()
            .clone();

        assert_eq!(store.excursions().len(), 1);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.kapazitaet, Some(12));
    }

    #[test]
    fn test_upsert_update_keeps_archived_unless_given() {
        let (mut store, _storage) = test_store();
        store.upsert_excursion(alpine(), None).unwrap();
        store.toggle_archive("E1", true).unwrap();

        let updated = store.upsert_excursion(alpine(), None).unwrap();
        assert!(updated.archived);

        let updated = store
            .upsert_excursion(alpine().with_archived(false), None)
            .unwrap();
        assert!(!updated.archived);
    }

    #[test]
    fn test_upsert_rename_in_place() {
        let (mut store, _storage) = test_store();
        store
            .upsert_excursion(ExcursionInput::new("E0", "Harz", "2025-05-20", "Goslar"), None)
            .unwrap();
        let original = store.upsert_excursion(alpine(), None).unwrap().clone();

        let renamed = store
            .upsert_excursion(
                ExcursionInput::new("E1-2025", "Alpine Trip", "2025-06-01", "Zermatt"),
                Some("E1"),
            )
            .unwrap()
            .clone();

        assert_eq!(renamed.created_at, original.created_at);
        assert!(store.excursion_by_id("E1").is_none());
        let ids: Vec<&str> = store.excursions().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["E0", "E1-2025"]);
    }

    #[test]
    fn test_upsert_rename_conflict_changes_nothing() {
        let (mut store, storage) = test_store();
        store
            .upsert_excursion(ExcursionInput::new("E0", "Harz", "2025-05-20", "Goslar"), None)
            .unwrap();
        store.upsert_excursion(alpine(), None).unwrap();
        let before = store.excursions().to_vec();
        let persisted_before = storage.get_item(DATA_STORAGE_KEY).unwrap();

        let result = store.upsert_excursion(
            ExcursionInput::new("E0", "Umbenannt", "2025-06-01", "Zermatt"),
            Some("E1"),
        );

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.excursions(), before.as_slice());
        assert_eq!(storage.get_item(DATA_STORAGE_KEY).unwrap(), persisted_before);
    }

    #[test]
    fn test_upsert_blank_id_is_validation_error() {
        let (mut store, storage) = test_store();

        let result = store.upsert_excursion(ExcursionInput::new("   ", "x", "y", "z"), None);

        match result {
            Err(StoreError::Validation(message)) => assert_eq!(message, MSG_EXCURSION_ID_REQUIRED),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(store.excursions().is_empty());
        assert!(storage.get_item(DATA_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_upsert_unknown_original_id_inserts() {
        let (mut store, _storage) = test_store();
        store.upsert_excursion(alpine(), Some("NOPE")).unwrap();
        assert_eq!(store.excursions().len(), 1);
    }

    #[test]
    fn test_toggle_archive() {
        let (mut store, _storage) = test_store();
        let created = store.upsert_excursion(alpine(), None).unwrap().clone();

        assert!(store.toggle_archive("E1", true).unwrap());
        let archived = store.excursion_by_id("E1").unwrap();
        assert!(archived.archived);
        assert!(archived.updated_at > created.updated_at);
        assert_eq!(store.active_excursions().count(), 0);

        assert!(!store.toggle_archive("NOPE", true).unwrap());
    }

    #[test]
    fn test_delete_excursion_keeps_teilnehmer() {
        let (mut store, storage) = test_store();
        store.upsert_excursion(alpine(), None).unwrap();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();

        assert!(store.delete_excursion("E1").unwrap());
        assert!(!store.delete_excursion("E1").unwrap());

        let reopened = reopen(&storage);
        assert!(reopened.excursions().is_empty());
        let entry = reopened.teilnehmer_by_id("t-1").unwrap();
        assert_eq!(entry.exkursion_snapshot.as_ref().unwrap().titel, "Alpine Trip");
    }

    #[test]
    fn test_missing_id_mutations_do_not_write() {
        let (mut store, storage) = test_store();

        assert!(!store.delete_excursion("NOPE").unwrap());
        assert!(!store.update_status("NOPE", TeilnehmerStatus::Abgelehnt).unwrap());
        assert!(!store.delete_teilnehmer("NOPE").unwrap());

        assert!(storage.get_item(DATA_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_record_submission_defaults() {
        let (mut store, _storage) = test_store();
        store.upsert_excursion(alpine(), None).unwrap();

        let entry = store.record_submission(submission("t-1", "E1", "Ada")).unwrap();

        assert_eq!(entry.status, TeilnehmerStatus::Eingegangen);
        assert_eq!(entry.submitted_at, entry.updated_at);
        assert_eq!(
            entry.exkursion_snapshot,
            Some(ExkursionRef {
                id: "E1".into(),
                titel: "Alpine Trip".into(),
                datum: "2025-06-01".into(),
                ort: "Zermatt".into(),
            })
        );
    }

    #[test]
    fn test_record_submission_prefers_given_snapshot() {
        let (mut store, _storage) = test_store();
        store.upsert_excursion(alpine(), None).unwrap();
        let mut input = submission("t-1", "E1", "Ada");
        input.exkursion_snapshot = Some(ExkursionRef {
            id: "E1".into(),
            titel: "Wie gesehen".into(),
            ..Default::default()
        });

        let entry = store.record_submission(input).unwrap();
        assert_eq!(entry.exkursion_snapshot.as_ref().unwrap().titel, "Wie gesehen");
    }

    #[test]
    fn test_record_submission_without_known_excursion_has_no_snapshot() {
        let (mut store, _storage) = test_store();
        let entry = store.record_submission(submission("t-1", "NOPE", "Ada")).unwrap();
        assert!(entry.exkursion_snapshot.is_none());
    }

    #[test]
    fn test_record_submission_twice_replaces_in_place() {
        let (mut store, storage) = test_store();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();
        store.record_submission(submission("t-2", "E1", "Grace")).unwrap();

        store.record_submission(submission("t-1", "E1", "Augusta")).unwrap();

        let ids: Vec<&str> = store.teilnehmer().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t-1", "t-2"]);
        assert_eq!(store.teilnehmer()[0].persoenlich.vorname, "Augusta");
        assert_eq!(reopen(&storage).teilnehmer().len(), 2);
    }

    #[test]
    fn test_record_submission_keeps_given_submitted_at() {
        let (mut store, _storage) = test_store();
        let first = store
            .record_submission(submission("t-1", "E1", "Ada"))
            .unwrap()
            .clone();

        let mut again = submission("t-1", "E1", "Ada");
        again.submitted_at = Some(first.submitted_at);
        again.status = Some(TeilnehmerStatus::Bestaetigt);
        let second = store.record_submission(again).unwrap();

        assert_eq!(second.submitted_at, first.submitted_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.status, TeilnehmerStatus::Bestaetigt);
    }

    #[test]
    fn test_update_status_any_transition() {
        let (mut store, _storage) = test_store();
        let recorded = store
            .record_submission(submission("t-1", "E1", "Ada"))
            .unwrap()
            .clone();

        for status in [
            TeilnehmerStatus::Abgelehnt,
            TeilnehmerStatus::Bestaetigt,
            TeilnehmerStatus::Eingegangen,
        ] {
            assert!(store.update_status("t-1", status).unwrap());
            assert_eq!(store.teilnehmer_by_id("t-1").unwrap().status, status);
        }
        assert!(store.teilnehmer_by_id("t-1").unwrap().updated_at > recorded.updated_at);
    }

    #[test]
    fn test_delete_teilnehmer() {
        let (mut store, storage) = test_store();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();

        assert!(store.delete_teilnehmer("t-1").unwrap());
        assert!(store.teilnehmer().is_empty());
        assert!(reopen(&storage).teilnehmer().is_empty());
    }

    #[test]
    fn test_teilnehmer_by_excursion() {
        let (mut store, _storage) = test_store();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();
        store.record_submission(submission("t-2", "E2", "Grace")).unwrap();

        assert_eq!(store.teilnehmer_by_excursion(Some("E2")).len(), 1);
        assert_eq!(store.teilnehmer_by_excursion(None).len(), 2);
    }

    #[test]
    fn test_persisted_roundtrip() {
        let (mut store, storage) = test_store();
        store
            .upsert_excursion(alpine().with_beschreibung("Gletscher").with_kapazitaet(20), None)
            .unwrap();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();

        let reopened = reopen(&storage);

        assert_eq!(reopened.excursions(), store.excursions());
        assert_eq!(reopened.teilnehmer(), store.teilnehmer());
        assert!(reopened.error().is_none());
    }

    #[test]
    fn test_export_csv_uses_live_title() {
        let (mut store, _storage) = test_store();
        store.upsert_excursion(alpine(), None).unwrap();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();
        store
            .upsert_excursion(
                ExcursionInput::new("E1", "Alpine Trip; Teil 2", "2025-06-01", "Zermatt"),
                None,
            )
            .unwrap();

        let csv = store.export_csv(None);

        assert!(csv.starts_with(BOM));
        assert!(csv.contains("\"Alpine Trip; Teil 2\""));
        assert_eq!(store.export_csv(Some("E2")).lines().count(), 1);
    }

    #[test]
    fn test_export_csv_hydrates_and_ignores_blank_filter() {
        let (mut store, storage) = test_store();
        store.record_submission(submission("t-1", "E1", "Ada")).unwrap();
        store.record_submission(submission("t-2", "E2", "Grace")).unwrap();

        let mut fresh = RecordsStore::new(storage, "geheim");
        assert!(!fresh.is_hydrated());

        assert_eq!(fresh.export_csv(Some("")).lines().count(), 3);
        assert!(fresh.is_hydrated());
        assert_eq!(fresh.export_csv(Some("E1")).lines().count(), 2);
        assert_eq!(fresh.teilnehmer_by_excursion(Some(" ")).len(), 2);
    }
}
