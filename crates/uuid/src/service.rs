//! Internal implementation of the identifier types.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical UUID representation (32 lowercase hex characters, no hyphens).
///
/// Once constructed, the contained UUID is guaranteed to be in canonical form, so its string
/// representation is stable wherever it is embedded (record ids, chat message ids).
///
/// # Construction
/// - [`CanonicalUuid::new`] generates a fresh random (v4) UUID.
/// - [`CanonicalUuid::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalUuid(Uuid);

impl Default for CanonicalUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalUuid {
    /// Generates a new random UUID in canonical form.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid UUID '{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for CanonicalUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for CanonicalUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalUuid::parse(s)
    }
}

/// A time-prefixed record identifier.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// The UUID half makes the id globally unique; the timestamp half keeps ids human-readable
/// and sortable by creation time. Timestamps carry millisecond precision only, so a value
/// survives a display/parse round trip unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimestampId {
    timestamp: DateTime<Utc>,
    uuid: CanonicalUuid,
}

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3f";

impl TimestampId {
    /// Generate a new id.
    ///
    /// If `last` is provided, the timestamp is guaranteed to be strictly greater than
    /// the last one (by at least 1 ms).
    pub fn generate(last: Option<&TimestampId>) -> Self {
        let now = truncate_to_millis(Utc::now());

        let timestamp = match last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: CanonicalUuid::new(),
        }
    }

    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> &CanonicalUuid {
        &self.uuid
    }
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

impl FromStr for TimestampId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s.split_once('-').ok_or_else(|| {
            UuidError::InvalidInput(format!("Invalid timestamp id format: '{}'", s))
        })?;

        let ts_no_z = ts_str.strip_suffix('Z').ok_or_else(|| {
            UuidError::InvalidInput(format!("Timestamp must end with 'Z': '{}'", ts_str))
        })?;

        let naive = chrono::NaiveDateTime::parse_from_str(ts_no_z, TIMESTAMP_FORMAT).map_err(
            |e| UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e)),
        )?;

        Ok(Self {
            timestamp: DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc),
            uuid: CanonicalUuid::parse(uuid_str)?,
        })
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Z-{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.uuid
        )
    }
}

/// Hands out [`TimestampId`]s with strictly increasing timestamps.
///
/// Shared by reference; the last issued id is kept behind a mutex so concurrent callers
/// still receive distinct, ordered ids.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    last: Mutex<Option<TimestampId>>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id.
    pub fn next_id(&self) -> TimestampId {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = TimestampId::generate(last.as_ref());
        *last = Some(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_generates_canonical_uuid() {
        let canonical = CanonicalUuid::new().to_string();

        assert_eq!(canonical.len(), 32);
        assert!(CanonicalUuid::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_rejects_non_canonical_forms() {
        assert!(CanonicalUuid::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(CanonicalUuid::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(CanonicalUuid::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(CanonicalUuid::parse("550e8400e29b41d4a716446655440zzz").is_err());
        assert!(CanonicalUuid::parse("").is_err());
    }

    #[test]
    fn test_parse_valid_canonical_uuid() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let parsed: CanonicalUuid = canonical.parse().unwrap();

        assert_eq!(parsed.to_string(), canonical);
        assert_eq!(parsed.uuid().simple().to_string(), canonical);
    }

    #[test]
    fn test_timestamp_id_generate_same_instant_is_strictly_later() {
        let id1 = TimestampId::generate(None);
        let id2 = TimestampId::generate(Some(&id1));

        assert!(id2.timestamp() > id1.timestamp());
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_timestamp_id_display_format() {
        let displayed = TimestampId::generate(None).to_string();

        let (ts, uuid) = displayed.split_once('-').unwrap();
        assert!(ts.starts_with("20"));
        assert!(ts.ends_with('Z'));
        assert_eq!(ts.len(), "20260111T143522.045Z".len());
        assert!(CanonicalUuid::is_canonical(uuid));
    }

    #[test]
    fn test_timestamp_id_round_trip() {
        let original_str = "20260111T143522.045Z-550e8400e29b41d4a716446655440000";
        let original = TimestampId::from_str(original_str).unwrap();

        assert_eq!(original.to_string(), original_str);
        assert_eq!(TimestampId::from_str(&original.to_string()).unwrap(), original);

        let generated = TimestampId::generate(None);
        let reparsed = TimestampId::from_str(&generated.to_string()).unwrap();
        assert_eq!(generated, reparsed);
    }

    #[test]
    fn test_timestamp_id_parse_errors() {
        match TimestampId::from_str("20260111T143522.045Z550e8400e29b41d4a716446655440000") {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("Invalid timestamp id format"))
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        match TimestampId::from_str("20260111T143522.045-550e8400e29b41d4a716446655440000") {
            Err(UuidError::InvalidInput(msg)) => assert!(msg.contains("must end with 'Z'")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        assert!(
            TimestampId::from_str("20260199T143522.045Z-550e8400e29b41d4a716446655440000")
                .is_err()
        );
        // Legacy wall-clock ids are not timestamp ids.
        assert!(TimestampId::from_str("1712345678901").is_err());
    }

    #[test]
    fn test_generator_issues_distinct_increasing_ids() {
        let generator = TimestampIdGenerator::new();
        let ids: Vec<TimestampId> = (0..200).map(|_| generator.next_id()).collect();

        for pair in ids.windows(2) {
            assert!(pair[1].timestamp() > pair[0].timestamp());
        }

        let distinct: HashSet<String> = ids.iter().map(|id| id.to_string()).collect();
        assert_eq!(distinct.len(), ids.len());
    }

    #[test]
    fn test_generator_is_shareable_across_threads() {
        let generator = std::sync::Arc::new(TimestampIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| generator.next_id().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate id issued");
            }
        }
        assert_eq!(all.len(), 200);
    }
}
