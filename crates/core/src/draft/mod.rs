//! Manual-entry draft aggregation.
//!
//! A record entered by hand is built up over three wizard steps (basic info, healthcare
//! info, vital signs). Until the final step commits, everything lives in a [`Draft`]: an
//! all-string superset of the record's creatable fields. Numeric vitals and the medication and
//! diagnosis lists stay unparsed until [`Draft::build_record`] runs at commit time.
//!
//! [`DraftFormAggregator`] holds the draft and performs shallow merges. [`ManualEntry`] layers
//! the step order on top as a type-state machine.
//!
//! Nothing here touches storage except [`ManualEntry::commit`]; an abandoned draft is simply
//! dropped.

mod parse;
mod wizard;

pub use wizard::{BasicStep, CommitFailure, HealthcareStep, ManualEntry, Step, VitalsStep};

use crate::models::{ExtractedData, MedicalRecord, Medication, RecordType};
use chrono::{DateTime, Utc};
use medwise_types::optional_text;
use parse::{parse_leading_float, parse_leading_int};
use serde::{Deserialize, Serialize};

/// The in-progress form for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub description: String,
    pub doctor_name: String,
    pub hospital_name: String,
    pub blood_pressure: String,
    pub heart_rate: String,
    pub temperature: String,
    pub weight: String,
    pub height: String,
    /// Comma-separated medication names.
    pub medications: String,
    pub diagnosis: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            title: String::new(),
            record_type: RecordType::Consultation,
            description: String::new(),
            doctor_name: String::new(),
            hospital_name: String::new(),
            blood_pressure: String::new(),
            heart_rate: String::new(),
            temperature: String::new(),
            weight: String::new(),
            height: String::new(),
            medications: String::new(),
            diagnosis: String::new(),
        }
    }
}

/// A partial update to a [`Draft`]. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftPatch {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<RecordType>,
    pub description: Option<String>,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<String>,
    pub temperature: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub medications: Option<String>,
    pub diagnosis: Option<String>,
}

impl Draft {
    /// Shallow merge: fields present in `patch` overwrite, everything else is kept.
    pub fn merge(&mut self, patch: DraftPatch) {
        fn set<T>(field: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *field = value;
            }
        }

        set(&mut self.title, patch.title);
        set(&mut self.record_type, patch.record_type);
        set(&mut self.description, patch.description);
        set(&mut self.doctor_name, patch.doctor_name);
        set(&mut self.hospital_name, patch.hospital_name);
        set(&mut self.blood_pressure, patch.blood_pressure);
        set(&mut self.heart_rate, patch.heart_rate);
        set(&mut self.temperature, patch.temperature);
        set(&mut self.weight, patch.weight);
        set(&mut self.height, patch.height);
        set(&mut self.medications, patch.medications);
        set(&mut self.diagnosis, patch.diagnosis);
    }

    /// Converts the complete draft into a record.
    ///
    /// - blank title becomes `New <type label>`
    /// - `heartRate` is parsed as an integer, `temperature`/`weight`/`height` as floats;
    ///   blank or non-numeric input leaves the value unset
    /// - non-empty `medications` is split on commas and every segment trimmed, empty ones
    ///   included; dosage and frequency are not collected by the form and stay empty
    /// - a non-empty `diagnosis` becomes a one-element list, kept as typed
    /// - blank description, doctor, hospital and blood pressure are left unset
    pub fn build_record(&self, id: impl Into<String>, date: DateTime<Utc>) -> MedicalRecord {
        let mut record = MedicalRecord::new(id, date, self.title.clone(), self.record_type);
        record.description = optional_text(&self.description);
        record.doctor_name = optional_text(&self.doctor_name);
        record.hospital_name = optional_text(&self.hospital_name);

        record.extracted_data = Some(ExtractedData {
            blood_pressure: optional_text(&self.blood_pressure),
            heart_rate: parse_leading_int(&self.heart_rate),
            temperature: parse_leading_float(&self.temperature),
            weight: parse_leading_float(&self.weight),
            height: parse_leading_float(&self.height),
            medications: (!self.medications.is_empty()).then(|| {
                self.medications
                    .split(',')
                    .map(str::trim)
                    .map(Medication::named)
                    .collect()
            }),
            diagnosis: (!self.diagnosis.is_empty()).then(|| vec![self.diagnosis.clone()]),
            ..Default::default()
        });

        record
    }
}

/// Step 1 fields: title, type, description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub description: String,
}

/// Step 2 fields: doctor and hospital.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthcareInfo {
    pub doctor_name: String,
    pub hospital_name: String,
}

/// Step 3 fields: vitals, medications and diagnosis, all as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VitalSigns {
    pub blood_pressure: String,
    pub heart_rate: String,
    pub temperature: String,
    pub weight: String,
    pub height: String,
    pub medications: String,
    pub diagnosis: String,
}

impl From<BasicInfo> for DraftPatch {
    fn from(info: BasicInfo) -> Self {
        Self {
            title: Some(info.title),
            record_type: Some(info.record_type),
            description: Some(info.description),
            ..Default::default()
        }
    }
}

impl From<HealthcareInfo> for DraftPatch {
    fn from(info: HealthcareInfo) -> Self {
        Self {
            doctor_name: Some(info.doctor_name),
            hospital_name: Some(info.hospital_name),
            ..Default::default()
        }
    }
}

impl From<VitalSigns> for DraftPatch {
    fn from(vitals: VitalSigns) -> Self {
        Self {
            blood_pressure: Some(vitals.blood_pressure),
            heart_rate: Some(vitals.heart_rate),
            temperature: Some(vitals.temperature),
            weight: Some(vitals.weight),
            height: Some(vitals.height),
            medications: Some(vitals.medications),
            diagnosis: Some(vitals.diagnosis),
            ..Default::default()
        }
    }
}

// Prefill a step's form from the draft when the user navigates back to it.

impl From<&Draft> for BasicInfo {
    fn from(draft: &Draft) -> Self {
        Self {
            title: draft.title.clone(),
            record_type: draft.record_type,
            description: draft.description.clone(),
        }
    }
}

impl From<&Draft> for HealthcareInfo {
    fn from(draft: &Draft) -> Self {
        Self {
            doctor_name: draft.doctor_name.clone(),
            hospital_name: draft.hospital_name.clone(),
        }
    }
}

impl From<&Draft> for VitalSigns {
    fn from(draft: &Draft) -> Self {
        Self {
            blood_pressure: draft.blood_pressure.clone(),
            heart_rate: draft.heart_rate.clone(),
            temperature: draft.temperature.clone(),
            weight: draft.weight.clone(),
            height: draft.height.clone(),
            medications: draft.medications.clone(),
            diagnosis: draft.diagnosis.clone(),
        }
    }
}

/// Holds one draft and applies partial updates to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftFormAggregator {
    draft: Draft,
}

impl DraftFormAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form_data(&self) -> &Draft {
        &self.draft
    }

    pub fn update_form_data(&mut self, patch: impl Into<DraftPatch>) {
        self.draft.merge(patch.into());
    }

    pub fn reset_form_data(&mut self) {
        self.draft = Draft::default();
    }
}
