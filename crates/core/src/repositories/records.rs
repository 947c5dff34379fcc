//! Medical record, profile and chat persistence.
//!
//! [`RecordStore`] owns three logical collections, each addressed by one fixed key in the
//! underlying [`KeyValueStore`]:
//!
//! | collection | key (default namespace) | shape |
//! |---|---|---|
//! | medical records | `@medwise_records` | JSON array, insertion order |
//! | user profile | `@medwise_profile` | single JSON object |
//! | chat history | `@medwise_chat` | JSON array, insertion order |
//!
//! Every mutation is a whole-value read-modify-write. Each collection has its own async mutex
//! and every read-modify-write cycle holds it, so two saves issued without awaiting each other
//! are applied one after the other instead of one overwriting the other's append.
//!
//! An absent key is the empty state. A present but malformed value is an error: it is never
//! treated as empty, so a following write cannot silently discard what was stored.

use crate::config::{CoreConfig, StorageKeys};
use crate::kv::{FileStore, KeyValueStore, MemoryStore};
use crate::models::{ChatMessage, MedicalRecord, RecordPatch, UserProfile};
use crate::validation::{validate_profile, validate_record};
use crate::{StoreError, StoreResult};
use medwise_uuid::TimestampIdGenerator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct CollectionLocks {
    records: Mutex<()>,
    profile: Mutex<()>,
    chat: Mutex<()>,
}

/// Persistence façade for records, the user profile and chat history.
///
/// Cheap to clone; clones share the backing store, the per-collection locks and the id
/// generator.
#[derive(Debug, Clone)]
pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    keys: Arc<StorageKeys>,
    locks: Arc<CollectionLocks>,
    ids: Arc<TimestampIdGenerator>,
}

impl RecordStore {
    /// Creates a store over an injected key-value backend.
    pub fn new(kv: Arc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self {
            kv,
            keys: Arc::new(keys),
            locks: Arc::new(CollectionLocks::default()),
            ids: Arc::new(TimestampIdGenerator::new()),
        }
    }

    /// Creates a file-backed store in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StoreUnavailable` if the data directory cannot be prepared.
    pub async fn open(cfg: &CoreConfig) -> StoreResult<Self> {
        let kv = FileStore::open(cfg.data_dir()).await?;
        Ok(Self::new(Arc::new(kv), cfg.storage_keys()))
    }

    /// Creates a store over a fresh [`MemoryStore`] with the default keys.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), StorageKeys::default())
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Issues a new record id.
    ///
    /// Ids are time-prefixed UUIDs with strictly increasing timestamps, so records created
    /// in the same millisecond still get distinct ids.
    pub fn new_record_id(&self) -> String {
        self.ids.next_id().to_string()
    }

    // ------------------------------------------------------------------
    // Medical records
    // ------------------------------------------------------------------

    /// Appends `record` to the records collection.
    ///
    /// On success the record is the last element of the persisted list.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the record has an empty id or title
    /// - `Deserialization` if the stored list is malformed
    /// - `Serialization`, `Io` or `StoreUnavailable` if writing fails
    pub async fn save_medical_record(&self, record: MedicalRecord) -> StoreResult<()> {
        validate_record(&record)?;

        let _guard = self.locks.records.lock().await;
        let mut records: Vec<MedicalRecord> = self.read_list(&self.keys.records).await?;

        if records.iter().any(|r| r.id == record.id) {
            tracing::warn!("saving record with duplicate id {}", record.id);
        }

        tracing::debug!("saving record {} ({})", record.id, record.record_type);
        records.push(record);
        self.write_json(&self.keys.records, &records).await
    }

    /// Returns every record in insertion order, or an empty list if none were saved.
    pub async fn get_medical_records(&self) -> StoreResult<Vec<MedicalRecord>> {
        let _guard = self.locks.records.lock().await;
        self.read_list(&self.keys.records).await
    }

    /// Returns the first record with the given id.
    pub async fn get_medical_record(&self, id: &str) -> StoreResult<Option<MedicalRecord>> {
        let records = self.get_medical_records().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    /// Removes every record whose id equals `id` and returns how many were removed.
    ///
    /// Removing an unknown id is a no-op that leaves storage untouched.
    pub async fn delete_medical_record(&self, id: &str) -> StoreResult<usize> {
        let _guard = self.locks.records.lock().await;
        let records: Vec<MedicalRecord> = self.read_list(&self.keys.records).await?;

        let before = records.len();
        let remaining: Vec<MedicalRecord> = records.into_iter().filter(|r| r.id != id).collect();
        let removed = before - remaining.len();

        if removed == 0 {
            tracing::debug!("delete of unknown record {} ignored", id);
            return Ok(0);
        }

        tracing::debug!("deleting {} record(s) with id {}", removed, id);
        self.write_json(&self.keys.records, &remaining).await?;
        Ok(removed)
    }

    /// Applies `patch` to the first record with the given id, keeping its position.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has that id
    /// - `InvalidInput` if the patch is empty or would blank the title
    pub async fn update_medical_record(
        &self,
        id: &str,
        patch: &RecordPatch,
    ) -> StoreResult<MedicalRecord> {
        if patch.is_empty() {
            return Err(StoreError::InvalidInput("patch contains no changes".into()));
        }

        let _guard = self.locks.records.lock().await;
        let mut records: Vec<MedicalRecord> = self.read_list(&self.keys.records).await?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("record {}", id)))?;
        patch.apply(record)?;
        let updated = record.clone();

        tracing::debug!("updating record {}", id);
        self.write_json(&self.keys.records, &records).await?;
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // User profile
    // ------------------------------------------------------------------

    /// Replaces the stored profile wholesale. No fields of the previous profile survive.
    pub async fn save_user_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        validate_profile(profile)?;

        let _guard = self.locks.profile.lock().await;
        tracing::debug!("saving user profile");
        self.write_json(&self.keys.profile, profile).await
    }

    /// Returns the stored profile, or `None` if none has been saved.
    pub async fn get_user_profile(&self) -> StoreResult<Option<UserProfile>> {
        let _guard = self.locks.profile.lock().await;
        self.read_json(&self.keys.profile).await
    }

    // ------------------------------------------------------------------
    // Chat history
    // ------------------------------------------------------------------

    pub async fn get_chat_history(&self) -> StoreResult<Vec<ChatMessage>> {
        let _guard = self.locks.chat.lock().await;
        self.read_list(&self.keys.chat).await
    }

    pub async fn append_chat_message(&self, message: ChatMessage) -> StoreResult<()> {
        if message.id.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "chat message id cannot be empty".into(),
            ));
        }

        let _guard = self.locks.chat.lock().await;
        let mut history: Vec<ChatMessage> = self.read_list(&self.keys.chat).await?;
        history.push(message);
        self.write_json(&self.keys.chat, &history).await
    }

    pub async fn clear_chat_history(&self) -> StoreResult<()> {
        let _guard = self.locks.chat.lock().await;
        self.kv.remove(&self.keys.chat).await
    }

    // ------------------------------------------------------------------
    // Whole-store operations
    // ------------------------------------------------------------------

    /// Removes all three collections.
    pub async fn clear_all_data(&self) -> StoreResult<()> {
        let _records = self.locks.records.lock().await;
        let _profile = self.locks.profile.lock().await;
        let _chat = self.locks.chat.lock().await;

        tracing::info!("clearing all stored data");
        self.kv.multi_remove(&self.keys.all()).await
    }

    // ------------------------------------------------------------------
    // Helpers (callers hold the collection lock)
    // ------------------------------------------------------------------

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.kv.get(key).await? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Deserialization {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Vec<T>> {
        Ok(self.read_json::<Vec<T>>(key).await?.unwrap_or_default())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(StoreError::Serialization)?;
        self.kv.set(key, raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ChatMessage, EmergencyContact, ExtractedData, Gender, Medication, RecordType,
    };
    use chrono::{DateTime, TimeZone, Utc};
    use std::path::Path;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> MedicalRecord {
        MedicalRecord::new(
            id,
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            title,
            RecordType::LabReport,
        )
    }

    fn profile(name: &str, blood_type: &str) -> UserProfile {
        UserProfile {
            name: name.into(),
            age: 40,
            gender: Gender::Other,
            blood_type: blood_type.into(),
            allergies: vec!["Peanuts".into()],
            emergency_contact: EmergencyContact {
                name: format!("{} contact", name),
                phone: "555-0101".into(),
            },
            chronic_conditions: vec!["Asthma".into()],
        }
    }

    fn ids(records: &[MedicalRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    async fn file_store(dir: &Path) -> RecordStore {
        let cfg = CoreConfig::new(dir.to_path_buf(), "medwise").expect("config should be valid");
        RecordStore::open(&cfg).await.expect("open should succeed")
    }

    #[tokio::test]
    async fn test_empty_state_defaults() {
        let store = RecordStore::in_memory();

        assert!(store.get_medical_records().await.unwrap().is_empty());
        assert_eq!(store.get_user_profile().await.unwrap(), None);
        assert!(store.get_chat_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_saves_append_in_call_order() {
        let store = RecordStore::in_memory();

        for i in 0..5 {
            store
                .save_medical_record(record(&i.to_string(), &format!("Report {}", i)))
                .await
                .unwrap();
        }

        let records = store.get_medical_records().await.unwrap();
        assert_eq!(ids(&records), vec!["0", "1", "2", "3", "4"]);
        assert_eq!(records.last().unwrap().title, "Report 4");
    }

    #[tokio::test]
    async fn test_save_rejects_record_without_id() {
        let store = RecordStore::in_memory();

        let err = store.save_medical_record(record("  ", "x")).await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(store.get_medical_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_matching_ids() {
        let store = RecordStore::in_memory();
        for id in ["41", "42", "43"] {
            store.save_medical_record(record(id, id)).await.unwrap();
        }
        let before = store.get_medical_records().await.unwrap();

        let removed = store.delete_medical_record("42").await.unwrap();
        let after = store.get_medical_records().await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(ids(&after), vec!["41", "43"]);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[2]);
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_noop() {
        let store = RecordStore::in_memory();
        store.save_medical_record(record("1", "a")).await.unwrap();
        store.save_medical_record(record("2", "b")).await.unwrap();
        let before = store.get_medical_records().await.unwrap();

        assert_eq!(store.delete_medical_record("nonexistent").await.unwrap(), 0);
        assert_eq!(store.get_medical_records().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_removes_all_records_sharing_an_id() {
        let store = RecordStore::in_memory();
        store.save_medical_record(record("dup", "first")).await.unwrap();
        store.save_medical_record(record("keep", "other")).await.unwrap();
        store.save_medical_record(record("dup", "second")).await.unwrap();

        assert_eq!(store.delete_medical_record("dup").await.unwrap(), 2);
        assert_eq!(
            ids(&store.get_medical_records().await.unwrap()),
            vec!["keep"]
        );
    }

    #[tokio::test]
    async fn test_get_single_record() {
        let store = RecordStore::in_memory();
        store.save_medical_record(record("a", "Alpha")).await.unwrap();

        assert_eq!(
            store.get_medical_record("a").await.unwrap().unwrap().title,
            "Alpha"
        );
        assert!(store.get_medical_record("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_position_id_date_and_type() {
        let store = RecordStore::in_memory();
        for id in ["1", "2", "3"] {
            store.save_medical_record(record(id, id)).await.unwrap();
        }
        let original = store.get_medical_record("2").await.unwrap().unwrap();

        let patch = RecordPatch {
            title: Some("Lipid panel".into()),
            hospital_name: Some("Lagos General".into()),
            ..Default::default()
        };
        let updated = store.update_medical_record("2", &patch).await.unwrap();

        let records = store.get_medical_records().await.unwrap();
        assert_eq!(ids(&records), vec!["1", "2", "3"]);
        assert_eq!(records[1], updated);
        assert_eq!(updated.title, "Lipid panel");
        assert_eq!(updated.hospital_name.as_deref(), Some("Lagos General"));
        assert_eq!(updated.date, original.date);
        assert_eq!(updated.record_type, original.record_type);
    }

    #[tokio::test]
    async fn test_update_unknown_or_empty_patch() {
        let store = RecordStore::in_memory();
        store.save_medical_record(record("1", "a")).await.unwrap();

        let patch = RecordPatch {
            description: Some("x".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_medical_record("missing", &patch).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store
                .update_medical_record("1", &RecordPatch::default())
                .await,
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_overwrite_is_total() {
        let store = RecordStore::in_memory();
        let a = profile("Alice", "A+");
        let mut b = profile("Bob", "B-");
        b.allergies.clear();
        b.chronic_conditions.clear();

        store.save_user_profile(&a).await.unwrap();
        store.save_user_profile(&b).await.unwrap();

        assert_eq!(store.get_user_profile().await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn test_invalid_profile_is_not_written() {
        let store = RecordStore::in_memory();
        store.save_user_profile(&profile("Alice", "A+")).await.unwrap();

        let mut bad = profile("", "A+");
        bad.age = 0;
        assert!(store.save_user_profile(&bad).await.is_err());

        assert_eq!(
            store.get_user_profile().await.unwrap().unwrap().name,
            "Alice"
        );
    }

    #[tokio::test]
    async fn test_malformed_records_are_reported_not_overwritten() {
        let kv = Arc::new(MemoryStore::new());
        let store = RecordStore::new(kv.clone(), StorageKeys::default());
        kv.set("@medwise_records", "{not json".into()).await.unwrap();

        match store.get_medical_records().await {
            Err(StoreError::Deserialization { key, .. }) => assert_eq!(key, "@medwise_records"),
            other => panic!("expected Deserialization error, got {:?}", other),
        }

        assert!(store.save_medical_record(record("1", "a")).await.is_err());
        assert_eq!(
            kv.get("@medwise_records").await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_lose_nothing() {
        let store = RecordStore::in_memory();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let id = store.new_record_id();
                    store
                        .save_medical_record(record(&id, &format!("Concurrent {}", i)))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("task should not panic").expect("save should succeed");
        }

        let records = store.get_medical_records().await.unwrap();
        assert_eq!(records.len(), 50);

        let mut distinct: Vec<&str> = ids(&records);
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), 50);
    }

    #[tokio::test]
    async fn test_round_trip_through_file_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = file_store(temp_dir.path()).await;

        let date: DateTime<Utc> = "2026-02-14T08:15:30.250Z".parse().unwrap();
        let mut original = MedicalRecord::new(store.new_record_id(), date, "", RecordType::Consultation);
        original.description = Some("Follow-up".into());
        original.file_uri = Some("file:///docs/report.pdf".into());
        original.extracted_data = Some(ExtractedData {
            blood_pressure: Some("120/80".into()),
            heart_rate: Some(72),
            temperature: Some(36.8),
            medications: Some(vec![Medication {
                name: "Amoxicillin".into(),
                dosage: "500mg".into(),
                frequency: "3x daily".into(),
                duration: Some("7 days".into()),
            }]),
            diagnosis: Some(vec!["Sinusitis".into()]),
            ..Default::default()
        });
        store.save_medical_record(original.clone()).await.unwrap();

        // The date is stored as an RFC 3339 string and parsed back into a timestamp.
        let raw = std::fs::read_to_string(temp_dir.path().join("@medwise_records.json")).unwrap();
        let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0]["date"], "2026-02-14T08:15:30.250Z");

        let reopened = file_store(temp_dir.path()).await;
        let records = reopened.get_medical_records().await.unwrap();
        assert_eq!(records, vec![original]);
        assert_eq!(records[0].date, date);
    }

    #[tokio::test]
    async fn test_chat_history_append_and_clear() {
        let store = RecordStore::in_memory();
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        store
            .append_chat_message(ChatMessage::text("m1", "What is a normal heart rate?", true, ts))
            .await
            .unwrap();
        store
            .append_chat_message(ChatMessage::text("m2", "60 to 100 bpm at rest.", false, ts))
            .await
            .unwrap();

        let history = store.get_chat_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user);
        assert!(!history[1].is_user);

        store.clear_chat_history().await.unwrap();
        assert!(store.get_chat_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_data_empties_every_collection() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = file_store(temp_dir.path()).await;
        let ts = Utc.with_ymd_and_hms(2026, 5, 2, 10, 0, 0).unwrap();

        store.save_medical_record(record("1", "a")).await.unwrap();
        store.save_user_profile(&profile("Alice", "O-")).await.unwrap();
        store
            .append_chat_message(ChatMessage::text("m1", "hi", true, ts))
            .await
            .unwrap();

        store.clear_all_data().await.unwrap();

        assert!(store.get_medical_records().await.unwrap().is_empty());
        assert_eq!(store.get_user_profile().await.unwrap(), None);
        assert!(store.get_chat_history().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let a = RecordStore::new(kv.clone(), StorageKeys::for_namespace("a"));
        let b = RecordStore::new(kv, StorageKeys::for_namespace("b"));

        a.save_medical_record(record("1", "only in a")).await.unwrap();

        assert_eq!(a.get_medical_records().await.unwrap().len(), 1);
        assert!(b.get_medical_records().await.unwrap().is_empty());
    }
}
