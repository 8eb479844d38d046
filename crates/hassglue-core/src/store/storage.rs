// ── Versioned JSON storage ──
//
// One file per key under the storage directory, wrapped in a
// `{version, minor_version, key, data}` envelope. Writes go through a
// temporary file and a rename so a crash never leaves a torn file.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CoreError;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    minor_version: u32,
    key: &'a str,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(default = "default_minor_version")]
    minor_version: u32,
    data: serde_json::Value,
}

fn default_minor_version() -> u32 {
    1
}

pub struct Store {
    path: PathBuf,
    key: String,
    version: u32,
    minor_version: u32,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn new(storage_dir: impl AsRef<Path>, key: impl Into<String>, version: u32) -> Self {
        let key = key.into();
        Self {
            path: storage_dir.as_ref().join(&key),
            key,
            version,
            minor_version: 1,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored data. A missing file yields `Ok(None)`.
    ///
    /// Files written by a newer major version are rejected.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, CoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CoreError::StorageIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|source| self.format_error(source))?;
        if envelope.version > self.version {
            return Err(CoreError::UnsupportedStorageVersion {
                key: self.key.clone(),
                found: envelope.version,
                supported: self.version,
            });
        }
        debug!(
            key = %self.key,
            version = envelope.version,
            minor_version = envelope.minor_version,
            "loaded storage"
        );

        serde_json::from_value(envelope.data)
            .map(Some)
            .map_err(|source| self.format_error(source))
    }

    /// Write `data`, replacing whatever is stored.
    pub async fn save<T: Serialize + Sync>(&self, data: &T) -> Result<(), CoreError> {
        let envelope = EnvelopeRef {
            version: self.version,
            minor_version: self.minor_version,
            key: &self.key,
            data,
        };
        let bytes = serde_json::to_vec_pretty(&envelope).map_err(|source| self.format_error(source))?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!(key = %self.key, path = %self.path.display(), "wrote storage");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> CoreError {
        CoreError::StorageIo {
            path: self.path.clone(),
            source,
        }
    }

    fn format_error(&self, source: serde_json::Error) -> CoreError {
        CoreError::StorageFormat {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), "test.key", 1);
        let loaded: Option<BTreeMap<String, u32>> = assert_ok!(store.load().await);
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_writes_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested"), "test.key", 1);
        let data = BTreeMap::from([("a".to_owned(), 1u32)]);
        assert_ok!(store.save(&data).await);

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"version": 1, "minor_version": 1, "key": "test.key", "data": {"a": 1}})
        );

        let loaded: BTreeMap<String, u32> = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn newer_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("test.key"),
            r#"{"version": 2, "key": "test.key", "data": {}}"#,
        )
        .unwrap();

        let store = Store::new(dir.path(), "test.key", 1);
        let err = assert_err!(store.load::<serde_json::Value>().await);
        assert!(matches!(
            err,
            CoreError::UnsupportedStorageVersion { found: 2, supported: 1, .. }
        ));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.key"), "{not json").unwrap();

        let store = Store::new(dir.path(), "test.key", 1);
        let err = store.load::<serde_json::Value>().await.unwrap_err();
        assert!(matches!(err, CoreError::StorageFormat { .. }));
    }
}
