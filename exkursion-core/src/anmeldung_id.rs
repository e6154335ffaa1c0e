//! Registration identifiers.
//!
//! A draft receives its identifier once and keeps it until reset, so a
//! resubmission of the same draft replaces the earlier record.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, SeedableRng, TryRngCore};
use uuid::{Builder, Uuid};

/// Prefix of identifiers produced without OS randomness.
const FALLBACK_PREFIX: &str = "anmeldung";

/// Generates a random, URL-safe registration identifier.
///
/// Uses a v4 UUID from the OS random source. If that source is unavailable,
/// falls back to `anmeldung-<random>-<unix millis>`.
pub fn generate_anmeldung_id() -> String {
    match os_random_uuid() {
        Some(uuid) => uuid.to_string(),
        None => {
            tracing::warn!("OS random source unavailable, using time-based registration id");
            fallback_id()
        }
    }
}

fn os_random_uuid() -> Option<Uuid> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes).ok()?;
    Some(Builder::from_random_bytes(bytes).into_uuid())
}

fn fallback_id() -> String {
    let now = Utc::now();
    let seed = now.timestamp_nanos_opt().unwrap_or_default() as u64;
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut bytes = [0u8; 6];
    rng.fill(&mut bytes);

    format!(
        "{}-{}-{}",
        FALLBACK_PREFIX,
        URL_SAFE_NO_PAD.encode(bytes),
        now.timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_url_safe(id: &str) -> bool {
        id.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn test_generate_returns_uuid() {
        let id = generate_anmeldung_id();
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert!(is_url_safe(&id));
    }

    #[test]
    fn test_generate_returns_unique() {
        assert_ne!(generate_anmeldung_id(), generate_anmeldung_id());
    }

    #[test]
    fn test_fallback_format() {
        let id = fallback_id();
        assert!(id.starts_with("anmeldung-"));
        assert!(is_url_safe(&id));

        let millis = id.rsplit('-').next().unwrap();
        assert!(millis.parse::<i64>().is_ok());
    }
}
