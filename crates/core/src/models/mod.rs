//! Persisted entity model.

pub mod chat;
pub mod profile;
pub mod record;

pub use chat::{ChatMessage, ChatMessageKind};
pub use profile::{EmergencyContact, Gender, UserProfile};
pub use record::{ExtractedData, MedicalRecord, Medication, RecordPatch, RecordType};
