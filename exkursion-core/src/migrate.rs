//! Persisted blob formats and their migration to the current schema.
//!
//! Every blob written by this crate carries `schemaVersion`. Blobs without
//! it are inferred from their shape:
//!
//! ```text
//! v1  draft/teilnehmer hold a positional `checklist` (check1..check7),
//!     records use the `exkursionen` key, auth uses isAdmin/adminToken
//! v2  named `confirmations`, `excursions`, isAuthenticated/authToken
//! ```
//!
//! Decoding is lenient about missing fields (they take defaults) and strict
//! about wrong top-level shapes (those are reported as [`DecodeError`]).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::models::{
    normalize_kapazitaet, normalize_text, sanitize_excursion, Confirmation, Confirmations,
    Excursion, ExkursionRef, LegacyChecklist, NotfallKontakt, Persoenlich, RegistrationDraft,
    Teilnehmer, TeilnehmerStatus,
};

/// Schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 2;

const LEGACY_SCHEMA_VERSION: u32 = 1;

/// Persisted authentication flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthState {
    #[serde(alias = "isAdmin")]
    pub is_authenticated: bool,
    #[serde(alias = "adminToken")]
    pub auth_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionedAuth<'a> {
    schema_version: u32,
    #[serde(flatten)]
    auth: &'a AuthState,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionedDraft<'a> {
    schema_version: u32,
    #[serde(flatten)]
    draft: &'a RegistrationDraft,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordsSnapshot<'a> {
    schema_version: u32,
    excursions: &'a [Excursion],
    teilnehmer: &'a [Teilnehmer],
}

/// Records blob as found in storage, any version.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecords {
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(default, alias = "exkursionen")]
    excursions: Option<Vec<StoredExcursion>>,
    #[serde(default)]
    teilnehmer: Option<Vec<StoredTeilnehmer>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredExcursion {
    id: String,
    #[serde(default)]
    titel: String,
    #[serde(default)]
    datum: String,
    #[serde(default)]
    ort: String,
    #[serde(default)]
    beschreibung: Option<String>,
    #[serde(default)]
    kapazitaet: Option<i64>,
    #[serde(default)]
    archived: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTeilnehmer {
    id: String,
    #[serde(default)]
    exkursion_id: String,
    #[serde(default)]
    persoenlich: Persoenlich,
    #[serde(default)]
    notfall: NotfallKontakt,
    #[serde(default)]
    note: String,
    #[serde(default)]
    confirmations: Option<Confirmations>,
    #[serde(default)]
    checklist: Option<LegacyChecklist>,
    #[serde(default)]
    status: Option<TeilnehmerStatus>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    exkursion_snapshot: Option<ExkursionRef>,
}

/// Maps the positional legacy checklist onto the named declarations.
///
/// `checkN` becomes the N-th entry of [`Confirmation::ALL`].
pub fn confirmations_from_checklist(checklist: &LegacyChecklist) -> Confirmations {
    let mut confirmations = Confirmations::default();
    for (which, value) in Confirmation::ALL.into_iter().zip(checklist.flags()) {
        confirmations.set(which, value);
    }
    confirmations
}

fn resolve_confirmations(
    confirmations: Option<Confirmations>,
    checklist: Option<LegacyChecklist>,
) -> Confirmations {
    confirmations
        .or_else(|| checklist.as_ref().map(confirmations_from_checklist))
        .unwrap_or_default()
}

fn migrate_excursion(stored: StoredExcursion, now: DateTime<Utc>) -> Excursion {
    let mut excursion = Excursion {
        id: stored.id,
        titel: stored.titel,
        datum: stored.datum,
        ort: stored.ort,
        beschreibung: normalize_text(stored.beschreibung),
        kapazitaet: normalize_kapazitaet(stored.kapazitaet),
        archived: stored.archived.unwrap_or(false),
        created_at: stored.created_at.unwrap_or(now),
        updated_at: stored.updated_at.unwrap_or(now),
    };
    sanitize_excursion(&mut excursion);
    excursion
}

fn migrate_teilnehmer(stored: StoredTeilnehmer, now: DateTime<Utc>) -> Teilnehmer {
    Teilnehmer {
        id: stored.id,
        exkursion_id: stored.exkursion_id,
        persoenlich: stored.persoenlich,
        notfall: stored.notfall,
        note: stored.note,
        confirmations: resolve_confirmations(stored.confirmations, stored.checklist),
        status: stored.status.unwrap_or_default(),
        submitted_at: stored.submitted_at.unwrap_or(now),
        updated_at: stored.updated_at.unwrap_or(now),
        exkursion_snapshot: stored.exkursion_snapshot,
    }
}

/// Decodes the records blob, back-filling missing timestamps with `now`
/// and a missing status with `eingegangen`.
pub fn migrate_records(
    raw: &str,
    now: DateTime<Utc>,
) -> Result<(Vec<Excursion>, Vec<Teilnehmer>), DecodeError> {
    let stored: StoredRecords = serde_json::from_str(raw)?;

    let version = stored.schema_version.unwrap_or(LEGACY_SCHEMA_VERSION);
    if version > SCHEMA_VERSION {
        tracing::warn!(
            "Records blob has schema version {}, newer than {}",
            version,
            SCHEMA_VERSION
        );
    }

    let excursions = stored
        .excursions
        .unwrap_or_default()
        .into_iter()
        .map(|e| migrate_excursion(e, now))
        .collect();
    let teilnehmer = stored
        .teilnehmer
        .unwrap_or_default()
        .into_iter()
        .map(|t| migrate_teilnehmer(t, now))
        .collect();

    Ok((excursions, teilnehmer))
}

/// Decodes the auth blob. Missing fields default to logged out.
pub fn decode_auth(raw: &str) -> Result<AuthState, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Decodes a draft blob of any version, merging every section field by
/// field over `defaults`.
///
/// A malformed section falls back to its default without failing the whole
/// draft. Only a blob that is not a JSON object is rejected.
pub fn migrate_draft(
    raw: &str,
    defaults: RegistrationDraft,
) -> Result<RegistrationDraft, DecodeError> {
    let mut blob = match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(json_kind(&other))),
    };

    let version = detect_draft_version(&blob);
    tracing::debug!("Migrating draft from schema version {}", version);

    let anmeldung_id = blob
        .remove("anmeldungId")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(defaults.anmeldung_id);

    let submitted_at = take_value::<Option<DateTime<Utc>>>(&mut blob, "submittedAt").flatten();
    let note = take_value::<String>(&mut blob, "note").unwrap_or(defaults.note);

    let confirmations = if version >= SCHEMA_VERSION {
        merge_section(&mut blob, "confirmations", defaults.confirmations)
    } else {
        take_value::<LegacyChecklist>(&mut blob, "checklist")
            .map(|checklist| confirmations_from_checklist(&checklist))
            .unwrap_or(defaults.confirmations)
    };

    Ok(RegistrationDraft {
        anmeldung_id,
        submitted_at,
        exkursion: merge_section(&mut blob, "exkursion", defaults.exkursion),
        persoenlich: merge_section(&mut blob, "persoenlich", defaults.persoenlich),
        notfall: merge_section(&mut blob, "notfall", defaults.notfall),
        note,
        confirmations,
    })
}

fn detect_draft_version(blob: &Map<String, Value>) -> u32 {
    if let Some(version) = blob.get("schemaVersion").and_then(Value::as_u64) {
        return u32::try_from(version).unwrap_or(SCHEMA_VERSION);
    }
    if blob.contains_key("checklist") && !blob.contains_key("confirmations") {
        LEGACY_SCHEMA_VERSION
    } else {
        SCHEMA_VERSION
    }
}

/// Removes `key` and decodes it. `None` when absent, null or malformed.
fn take_value<T: DeserializeOwned>(blob: &mut Map<String, Value>, key: &str) -> Option<T> {
    match blob.remove(key)? {
        Value::Null => None,
        value => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Ignoring malformed draft field '{}': {}", key, e);
                None
            }
        },
    }
}

/// Overlays the stored object for `key` onto the serialized `default`.
fn merge_section<T>(blob: &mut Map<String, Value>, key: &str, default: T) -> T
where
    T: Serialize + DeserializeOwned,
{
    let stored = match blob.remove(key) {
        Some(Value::Object(stored)) => stored,
        Some(Value::Null) | None => return default,
        Some(other) => {
            tracing::warn!(
                "Ignoring draft section '{}': expected object, found {}",
                key,
                json_kind(&other)
            );
            return default;
        }
    };

    let mut merged = match serde_json::to_value(&default) {
        Ok(Value::Object(base)) => base,
        _ => return default,
    };

    // Fields are taken one at a time so a bad value only loses itself.
    for (field, value) in stored {
        let mut candidate = merged.clone();
        candidate.insert(field.clone(), value);
        match serde_json::from_value::<T>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => {
                tracing::warn!("Ignoring draft field '{}.{}': {}", key, field, e);
            }
        }
    }

    match serde_json::from_value(Value::Object(merged)) {
        Ok(section) => section,
        Err(e) => {
            tracing::warn!("Ignoring malformed draft section '{}': {}", key, e);
            default
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Serializes the draft as an independent JSON value.
pub(crate) fn encode_draft(draft: &RegistrationDraft) -> Result<String, serde_json::Error> {
    serde_json::to_string(&VersionedDraft {
        schema_version: SCHEMA_VERSION,
        draft,
    })
}

pub(crate) fn encode_records(
    excursions: &[Excursion],
    teilnehmer: &[Teilnehmer],
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&RecordsSnapshot {
        schema_version: SCHEMA_VERSION,
        excursions,
        teilnehmer,
    })
}

pub(crate) fn encode_auth(auth: &AuthState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&VersionedAuth {
        schema_version: SCHEMA_VERSION,
        auth,
    })
}
