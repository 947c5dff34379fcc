//! Constants used throughout the MedWise core crate.

/// Default directory for on-disk key-value data when none is configured.
pub const DEFAULT_DATA_DIR: &str = "medwise_data";

/// Default storage key namespace. Keys are rendered as `@<namespace>_<collection>`.
pub const DEFAULT_NAMESPACE: &str = "medwise";

/// Collection suffix for the medical records list.
pub const RECORDS_COLLECTION: &str = "records";

/// Collection suffix for the single user profile blob.
pub const PROFILE_COLLECTION: &str = "profile";

/// Collection suffix for the chat history list.
pub const CHAT_COLLECTION: &str = "chat";

/// File extension used by the file-backed key-value store.
pub const KV_FILE_EXTENSION: &str = "json";

/// Blood groups accepted on a user profile.
pub const BLOOD_TYPES: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];
