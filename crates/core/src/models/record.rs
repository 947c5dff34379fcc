//! Medical record model.
//!
//! Records are stored as JSON with camelCase keys, for example:
//!
//! ```json
//! {
//!   "id": "20260111T143522.045Z-550e8400e29b41d4a716446655440000",
//!   "date": "2026-01-11T14:35:22.045Z",
//!   "title": "New consultation",
//!   "type": "consultation",
//!   "doctorName": "Dr. Bello",
//!   "extractedData": { "heartRate": 72, "diagnosis": ["Flu"] }
//! }
//! ```
//!
//! Absent optional fields are omitted rather than written as `null`.

use chrono::{DateTime, Utc};
use medwise_types::optional_text;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{StoreError, StoreResult};

/// Kind of medical event a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    LabReport,
    Prescription,
    Scan,
    Consultation,
    Other,
}

impl RecordType {
    pub const ALL: [RecordType; 5] = [
        RecordType::LabReport,
        RecordType::Prescription,
        RecordType::Scan,
        RecordType::Consultation,
        RecordType::Other,
    ];

    /// The stored identifier, e.g. `lab_report`.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::LabReport => "lab_report",
            RecordType::Prescription => "prescription",
            RecordType::Scan => "scan",
            RecordType::Consultation => "consultation",
            RecordType::Other => "other",
        }
    }

    /// Human-readable label: the identifier with its underscore replaced by a space.
    pub fn label(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    /// Title used when a record is created without one, e.g. `New lab report`.
    pub fn default_title(self) -> String {
        format!("New {}", self.label())
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| StoreError::InvalidInput(format!("unknown record type '{}'", s)))
    }
}

/// A prescribed or reported medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Medication {
    /// A medication known only by name, as captured by the manual-entry form.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: String::new(),
            frequency: String::new(),
            duration: None,
        }
    }
}

/// Structured values extracted from, or entered alongside, a record.
///
/// Keys the model does not know about are kept in `extra` so they survive a
/// read-modify-write cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<Medication>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A single persisted medical-event entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedData>,
}

/// Description given to records created by a capture flow before the user edits them.
pub const CAPTURE_PLACEHOLDER_DESCRIPTION: &str = "Click to add description";

impl MedicalRecord {
    /// Creates a record with only the required fields set.
    ///
    /// A blank `title` is replaced by the type's default title.
    pub fn new(
        id: impl Into<String>,
        date: DateTime<Utc>,
        title: impl Into<String>,
        record_type: RecordType,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            record_type.default_title()
        } else {
            title
        };

        Self {
            id: id.into(),
            date,
            title,
            record_type,
            description: None,
            file_uri: None,
            doctor_name: None,
            hospital_name: None,
            extracted_data: None,
        }
    }

    /// Placeholder record for a captured photo or picked document.
    ///
    /// The file reference is kept as given; it is never opened or checked here.
    pub fn captured(
        id: impl Into<String>,
        date: DateTime<Utc>,
        record_type: RecordType,
        file_uri: Option<String>,
    ) -> Self {
        let mut record = Self::new(id, date, "", record_type);
        record.file_uri = file_uri;
        record.description = Some(CAPTURE_PLACEHOLDER_DESCRIPTION.to_string());
        record
    }
}

/// Changes to apply to an existing record.
///
/// `id`, `date` and `type` are not patchable. For the optional text fields, `Some("")`
/// (or whitespace) clears the field; `None` leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_uri: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub extracted_data: Option<ExtractedData>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self == &RecordPatch::default()
    }

    /// Applies this patch to `record` in place.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if the patch would blank the title. The record is
    /// left untouched in that case.
    pub fn apply(&self, record: &mut MedicalRecord) -> StoreResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(StoreError::InvalidInput(
                    "record title cannot be empty".into(),
                ));
            }
            record.title = title.clone();
        }

        let text_fields = [
            (&self.description, &mut record.description),
            (&self.file_uri, &mut record.file_uri),
            (&self.doctor_name, &mut record.doctor_name),
            (&self.hospital_name, &mut record.hospital_name),
        ];
        for (patch, field) in text_fields {
            if let Some(value) = patch {
                *field = optional_text(value);
            }
        }

        if let Some(data) = &self.extracted_data {
            record.extracted_data = Some(data.clone());
        }

        Ok(())
    }
}
