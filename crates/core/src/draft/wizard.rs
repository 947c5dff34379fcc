//! The three-step manual-entry wizard.
//!
//! Uses the type-state pattern so step order is enforced at compile time:
//!
//! ```text
//! BasicStep --submit(BasicInfo)--> HealthcareStep --submit(HealthcareInfo)--> VitalsStep
//!     ^                                 |    ^                                     |
//!     +------------- back() ------------+    +-------------- back() ---------------+
//!
//! VitalsStep --commit(VitalSigns)--> record saved, fresh BasicStep with an empty draft
//! ```
//!
//! Going back never discards entered values; re-submitting a step overwrites only the
//! fields that step owns.

use super::{BasicInfo, Draft, DraftFormAggregator, HealthcareInfo, VitalSigns};
use crate::models::MedicalRecord;
use crate::repositories::records::RecordStore;
use crate::StoreError;
use chrono::Utc;

// ============================================================================
// TYPE-STATE MARKERS
// ============================================================================

/// Marker type: step 1, title/type/description.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicStep;

/// Marker type: step 2, doctor/hospital.
#[derive(Clone, Copy, Debug)]
pub struct HealthcareStep;

/// Marker type: step 3, vitals/medications/diagnosis. Only this step can commit.
#[derive(Clone, Copy, Debug)]
pub struct VitalsStep;

/// Position of a wizard step, for progress display.
pub trait Step {
    const NUMBER: u8;
    const NAME: &'static str;
}

impl Step for BasicStep {
    const NUMBER: u8 = 1;
    const NAME: &'static str = "basic-info";
}

impl Step for HealthcareStep {
    const NUMBER: u8 = 2;
    const NAME: &'static str = "healthcare-info";
}

impl Step for VitalsStep {
    const NUMBER: u8 = 3;
    const NAME: &'static str = "vital-signs";
}

// ============================================================================
// WIZARD
// ============================================================================

/// A manual-entry session positioned at step `S`.
#[derive(Clone, Debug)]
pub struct ManualEntry<S> {
    aggregator: DraftFormAggregator,
    _state: S,
}

/// Returned when the final save fails.
///
/// The wizard is handed back at the vital-signs step with the full draft (including the
/// submitted vitals) so the caller can retry or report the failure.
#[derive(Debug, thiserror::Error)]
#[error("failed to save manual entry: {error}")]
pub struct CommitFailure {
    pub entry: ManualEntry<VitalsStep>,
    #[source]
    pub error: StoreError,
}

impl ManualEntry<BasicStep> {
    /// Starts a wizard with an empty draft.
    pub fn new() -> Self {
        Self {
            aggregator: DraftFormAggregator::new(),
            _state: BasicStep,
        }
    }

    pub fn submit(mut self, info: BasicInfo) -> ManualEntry<HealthcareStep> {
        self.aggregator.update_form_data(info);
        self.advance(HealthcareStep)
    }
}

impl Default for ManualEntry<BasicStep> {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualEntry<HealthcareStep> {
    pub fn submit(mut self, info: HealthcareInfo) -> ManualEntry<VitalsStep> {
        self.aggregator.update_form_data(info);
        self.advance(VitalsStep)
    }

    pub fn back(self) -> ManualEntry<BasicStep> {
        self.advance(BasicStep)
    }
}

impl ManualEntry<VitalsStep> {
    pub fn back(self) -> ManualEntry<HealthcareStep> {
        self.advance(HealthcareStep)
    }

    /// Merges the final step, saves the resulting record and starts over.
    ///
    /// The record gets a fresh id from `store` and the current time as its date. On success
    /// the saved record is returned along with a new wizard at step 1 with an empty draft.
    ///
    /// # Errors
    ///
    /// Returns [`CommitFailure`] if the save fails; the draft is not reset in that case.
    pub async fn commit(
        mut self,
        vitals: VitalSigns,
        store: &RecordStore,
    ) -> Result<(MedicalRecord, ManualEntry<BasicStep>), CommitFailure> {
        self.aggregator.update_form_data(vitals);

        let record = self
            .aggregator
            .form_data()
            .build_record(store.new_record_id(), Utc::now());

        match store.save_medical_record(record.clone()).await {
            Ok(()) => {
                tracing::info!("manual entry committed as record {}", record.id);
                self.aggregator.reset_form_data();
                Ok((record, self.advance(BasicStep)))
            }
            Err(error) => {
                tracing::warn!("manual entry commit failed: {}", error);
                Err(CommitFailure { entry: self, error })
            }
        }
    }
}

impl<S: Step> ManualEntry<S> {
    pub fn step_number(&self) -> u8 {
        S::NUMBER
    }

    pub fn step_name(&self) -> &'static str {
        S::NAME
    }
}

impl<S> ManualEntry<S> {
    /// The draft accumulated so far.
    pub fn form_data(&self) -> &Draft {
        self.aggregator.form_data()
    }

    /// Leaves the wizard, discarding the draft. Nothing is persisted.
    pub fn abandon(self) -> ManualEntry<BasicStep> {
        tracing::debug!("manual entry abandoned");
        ManualEntry::new()
    }

    fn advance<T>(self, state: T) -> ManualEntry<T> {
        ManualEntry {
            aggregator: self.aggregator,
            _state: state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKeys;
    use crate::kv::{KeyValueStore, MemoryStore};
    use crate::models::RecordType;
    use crate::StoreResult;
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Backend whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, _key: &str, _value: String) -> StoreResult<()> {
            Err(StoreError::StoreUnavailable("read-only".into()))
        }

        async fn remove(&self, _key: &str) -> StoreResult<()> {
            Err(StoreError::StoreUnavailable("read-only".into()))
        }
    }

    fn basic() -> BasicInfo {
        BasicInfo {
            title: "Annual check".into(),
            record_type: RecordType::Consultation,
            description: "Routine".into(),
        }
    }

    fn healthcare() -> HealthcareInfo {
        HealthcareInfo {
            doctor_name: "Dr. Y".into(),
            hospital_name: "General".into(),
        }
    }

    fn vitals() -> VitalSigns {
        VitalSigns {
            blood_pressure: "118/76".into(),
            heart_rate: "64".into(),
            temperature: "36.7".into(),
            weight: "68".into(),
            height: "170".into(),
            medications: "Metformin".into(),
            diagnosis: "Type 2 diabetes".into(),
        }
    }

    #[test]
    fn test_steps_report_position() {
        let entry = ManualEntry::new();
        assert_eq!(entry.step_number(), 1);
        assert_eq!(entry.step_name(), "basic-info");

        let entry = entry.submit(basic());
        assert_eq!(entry.step_number(), 2);

        let entry = entry.submit(healthcare());
        assert_eq!(entry.step_number(), 3);
        assert_eq!(entry.step_name(), "vital-signs");
    }

    #[test]
    fn test_back_keeps_entered_values() {
        let entry = ManualEntry::new().submit(basic()).submit(healthcare());

        let entry = entry.back().back();
        assert_eq!(entry.form_data().title, "Annual check");
        assert_eq!(entry.form_data().doctor_name, "Dr. Y");

        let entry = entry
            .submit(BasicInfo {
                title: "Renamed".into(),
                ..basic()
            })
            .submit(HealthcareInfo::from(&Draft::default()));
        assert_eq!(entry.form_data().title, "Renamed");
        assert_eq!(entry.form_data().description, "Routine");
        assert_eq!(entry.form_data().doctor_name, "");
    }

    #[test]
    fn test_abandon_discards_draft() {
        let entry = ManualEntry::new().submit(basic()).submit(healthcare());

        let fresh = entry.abandon();

        assert_eq!(fresh.form_data(), &Draft::default());
        assert_eq!(fresh.step_number(), 1);
    }

    #[tokio::test]
    async fn test_commit_saves_record_and_resets() {
        let store = RecordStore::in_memory();
        let entry = ManualEntry::new().submit(basic()).submit(healthcare());

        let (record, next) = entry.commit(vitals(), &store).await.expect("commit should succeed");

        assert_eq!(next.form_data(), &Draft::default());
        assert_eq!(next.step_number(), 1);

        let stored = store.get_medical_records().await.unwrap();
        assert_eq!(stored, vec![record.clone()]);
        assert_eq!(record.title, "Annual check");
        assert_eq!(record.doctor_name.as_deref(), Some("Dr. Y"));
        let data = record.extracted_data.unwrap();
        assert_eq!(data.heart_rate, Some(64));
        assert_eq!(data.temperature, Some(36.7));
        assert_eq!(data.diagnosis, Some(vec!["Type 2 diabetes".to_string()]));
    }

    #[tokio::test]
    async fn test_wizard_is_reusable_after_commit() {
        let store = RecordStore::in_memory();

        let (first, entry) = ManualEntry::new()
            .submit(basic())
            .submit(healthcare())
            .commit(vitals(), &store)
            .await
            .unwrap();
        let (second, _) = entry
            .submit(BasicInfo {
                title: String::new(),
                record_type: RecordType::Prescription,
                description: String::new(),
            })
            .submit(HealthcareInfo::default())
            .commit(VitalSigns::default(), &store)
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(second.title, "New prescription");
        assert_eq!(second.doctor_name, None);

        let stored = store.get_medical_records().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].id, second.id);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_draft() {
        let store = RecordStore::new(Arc::new(ReadOnlyStore::default()), StorageKeys::default());
        let entry = ManualEntry::new().submit(basic()).submit(healthcare());

        let failure = entry
            .commit(vitals(), &store)
            .await
            .expect_err("commit should fail on a read-only store");

        assert!(matches!(failure.error, StoreError::StoreUnavailable(_)));
        assert_eq!(failure.entry.step_number(), 3);
        assert_eq!(failure.entry.form_data().title, "Annual check");
        assert_eq!(failure.entry.form_data().heart_rate, "64");
    }
}
