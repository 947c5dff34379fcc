//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads environment variables while handling a request.

use crate::constants::{
    CHAT_COLLECTION, DEFAULT_DATA_DIR, DEFAULT_NAMESPACE, PROFILE_COLLECTION, RECORDS_COLLECTION,
};
use crate::validation::validate_namespace;
use crate::StoreResult;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    namespace: String,
}

/// The fixed storage keys for one namespace, one per collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub records: String,
    pub profile: String,
    pub chat: String,
}

impl StorageKeys {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            records: format!("@{}_{}", namespace, RECORDS_COLLECTION),
            profile: format!("@{}_{}", namespace, PROFILE_COLLECTION),
            chat: format!("@{}_{}", namespace, CHAT_COLLECTION),
        }
    }

    /// All keys, in a stable order.
    pub fn all(&self) -> [&str; 3] {
        [&self.records, &self.profile, &self.chat]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::for_namespace(DEFAULT_NAMESPACE)
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidInput` if `namespace` is empty or contains characters
    /// outside `[A-Za-z0-9._-]`.
    pub fn new(data_dir: PathBuf, namespace: impl Into<String>) -> StoreResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;

        Ok(Self {
            data_dir,
            namespace,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::for_namespace(&self.namespace)
    }
}

/// Build a `CoreConfig` from optional raw values (typically environment variables).
///
/// Missing or blank values fall back to [`DEFAULT_DATA_DIR`] and [`DEFAULT_NAMESPACE`].
pub fn config_from_env_values(
    data_dir: Option<String>,
    namespace: Option<String>,
) -> StoreResult<CoreConfig> {
    fn non_blank(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    let data_dir = non_blank(data_dir).unwrap_or_else(|| DEFAULT_DATA_DIR.into());
    let namespace = non_blank(namespace).unwrap_or_else(|| DEFAULT_NAMESPACE.into());

    CoreConfig::new(PathBuf::from(data_dir), namespace)
}
