//! # MedWise Core
//!
//! Core data operations for the MedWise health-record keeper.
//!
//! This crate contains:
//! - The record model (`MedicalRecord`, `UserProfile`, `ChatMessage`)
//! - An asynchronous key-value store abstraction with in-memory and file backends
//! - [`RecordStore`], typed read-modify-write persistence over the key-value store
//! - The manual-entry draft aggregator and its three-step wizard
//!
//! **No API concerns**: HTTP servers and command-line handling belong in `api-rest` and `cli`.

pub mod config;
pub mod constants;
pub mod draft;
pub mod error;
pub mod kv;
pub mod models;
pub mod repositories;
pub mod validation;

pub use config::{CoreConfig, StorageKeys};
pub use constants::DEFAULT_DATA_DIR;
pub use draft::{
    BasicInfo, BasicStep, CommitFailure, Draft, DraftFormAggregator, DraftPatch, HealthcareInfo,
    HealthcareStep, ManualEntry, Step, VitalSigns, VitalsStep,
};
pub use error::{StoreError, StoreResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use models::{
    ChatMessage, ChatMessageKind, EmergencyContact, ExtractedData, Gender, MedicalRecord,
    Medication, RecordPatch, RecordType, UserProfile,
};
pub use repositories::records::RecordStore;

pub use medwise_types::{NonEmptyText, TextError};
pub use medwise_uuid::{TimestampId, TimestampIdGenerator};
