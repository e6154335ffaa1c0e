//! Error types shared by both stores.

use thiserror::Error;

use crate::storage::StorageError;

/// Message surfaced when an excursion is saved without an ID.
pub const MSG_EXCURSION_ID_REQUIRED: &str = "Eine Exkursions-ID ist erforderlich.";

/// Message surfaced when a rename collides with another excursion.
pub const MSG_EXCURSION_ID_TAKEN: &str = "Die gewünschte Exkursions-ID ist bereits vergeben.";

/// Message surfaced when a draft is submitted before an excursion was chosen.
pub const MSG_DRAFT_WITHOUT_EXCURSION: &str = "Es wurde keine Exkursions-ID hinterlegt.";

/// Advisory message recorded when persisted admin data could not be decoded.
pub const MSG_HYDRATE_FAILED: &str = "Persistierte Admin-Daten konnten nicht geladen werden.";

/// Errors returned by store operations.
///
/// `Validation` and `Conflict` abort the operation before any state changes.
/// `Storage` and `Encode` come from the write path and have no recovery.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn validation(message: &str) -> Self {
        StoreError::Validation(message.to_string())
    }

    pub(crate) fn conflict(message: &str) -> Self {
        StoreError::Conflict(message.to_string())
    }
}

/// Failure to decode a persisted blob.
///
/// Never escapes hydration; the stores log it and fall back to defaults.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}
