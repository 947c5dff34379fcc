//! Identifier utilities for MedWise records.
//!
//! Record identifiers must never collide, even when two records are created within the same
//! millisecond (for example a camera capture racing a manual entry, or a batch import). This
//! crate provides:
//!
//! - [`CanonicalUuid`], a wrapper guaranteeing the canonical form of a v4 UUID:
//!   **32 lowercase hexadecimal characters** (no hyphens).
//! - [`TimestampId`], a human-readable, time-prefixed identifier:
//!   `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`.
//! - [`TimestampIdGenerator`], which hands out `TimestampId`s with strictly increasing
//!   timestamps, so ids sort in creation order.
//!
//! Example id: `20260111T143522.045Z-550e8400e29b41d4a716446655440000`

mod service;

pub use service::{CanonicalUuid, TimestampId, TimestampIdGenerator, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
