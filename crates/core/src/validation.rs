//! Input validation utilities.
//!
//! These checks run before anything is written, so a rejected value never reaches storage.

use crate::constants::BLOOD_TYPES;
use crate::models::{MedicalRecord, UserProfile};
use crate::{StoreError, StoreResult};

/// Validates that a namespace is safe to embed in storage keys and file names.
///
/// - Rejects empty or whitespace-only strings
/// - Bounds the length
/// - Restricts characters to ASCII alphanumerics, `.`, `-` and `_`
pub fn validate_namespace(namespace: &str) -> StoreResult<()> {
    const MAX_NAMESPACE_LEN: usize = 64;

    if namespace.trim().is_empty() {
        return Err(StoreError::InvalidInput("namespace cannot be empty".into()));
    }

    if namespace.len() > MAX_NAMESPACE_LEN {
        return Err(StoreError::InvalidInput(format!(
            "namespace exceeds maximum length of {} characters",
            MAX_NAMESPACE_LEN
        )));
    }

    let ok = namespace
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok || namespace.starts_with('.') {
        return Err(StoreError::InvalidInput(
            "namespace contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                .into(),
        ));
    }

    Ok(())
}

/// Checks the persisted-record invariant: non-empty id and title.
///
/// The record type is a closed enum, so it cannot be out of range once deserialised.
pub fn validate_record(record: &MedicalRecord) -> StoreResult<()> {
    if record.id.trim().is_empty() {
        return Err(StoreError::InvalidInput("record id cannot be empty".into()));
    }
    if record.title.trim().is_empty() {
        return Err(StoreError::InvalidInput(
            "record title cannot be empty".into(),
        ));
    }
    Ok(())
}

/// Checks the fields the profile editor treats as required.
pub fn validate_profile(profile: &UserProfile) -> StoreResult<()> {
    let required = [
        ("name", profile.name.as_str()),
        ("bloodType", profile.blood_type.as_str()),
        ("emergencyContact.name", profile.emergency_contact.name.as_str()),
        ("emergencyContact.phone", profile.emergency_contact.phone.as_str()),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(StoreError::InvalidInput(format!("{} is required", field)));
        }
    }

    if profile.age == 0 {
        return Err(StoreError::InvalidInput("age must be positive".into()));
    }

    if !BLOOD_TYPES.contains(&profile.blood_type.as_str()) {
        return Err(StoreError::InvalidInput(format!(
            "unknown blood type '{}'",
            profile.blood_type
        )));
    }

    Ok(())
}
