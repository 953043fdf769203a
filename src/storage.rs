use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend is unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("failed to read key `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write key `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to remove key `{key}`: {reason}")]
    Remove { key: String, reason: String },
    #[error("stored value under `{key}` is not valid: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}

/// String-valued storage addressed by key, shaped after the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Clones share the same underlying map, which lets a
/// test keep a handle on what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::Read {
                key: key.to_string(),
                reason: error.to_string(),
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)
            .and_then(|_| fs::write(self.path_for(key), value))
            .map_err(|error| StorageError::Write {
                key: key.to_string(),
                reason: error.to_string(),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::Remove {
                key: key.to_string(),
                reason: error.to_string(),
            }),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{KeyValueStore, StorageError};
    use wasm_bindgen::JsValue;

    fn describe(value: JsValue) -> String {
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value))
    }

    /// `window.localStorage`. Private browsing modes may refuse access, in
    /// which case every call reports [`StorageError::Unavailable`].
    #[derive(Debug, Clone, Default)]
    pub struct BrowserStorage;

    impl BrowserStorage {
        fn storage(&self) -> Result<web_sys::Storage, StorageError> {
            let window = web_sys::window().ok_or_else(|| StorageError::Unavailable {
                reason: "no window".to_string(),
            })?;

            window
                .local_storage()
                .map_err(|error| StorageError::Unavailable {
                    reason: describe(error),
                })?
                .ok_or_else(|| StorageError::Unavailable {
                    reason: "localStorage is disabled".to_string(),
                })
        }
    }

    impl KeyValueStore for BrowserStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage()?
                .get_item(key)
                .map_err(|error| StorageError::Read {
                    key: key.to_string(),
                    reason: describe(error),
                })
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage()?
                .set_item(key, value)
                .map_err(|error| StorageError::Write {
                    key: key.to_string(),
                    reason: describe(error),
                })
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage()?
                .remove_item(key)
                .map_err(|error| StorageError::Remove {
                    key: key.to_string(),
                    reason: describe(error),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_clones_share_entries() {
        let mut storage = MemoryStorage::new();
        let observer = storage.clone();

        storage.set("key", "value").expect("memory write succeeds");
        assert_eq!(
            observer.get("key").expect("memory read succeeds"),
            Some("value".to_string())
        );

        storage.remove("key").expect("memory remove succeeds");
        assert!(observer.is_empty());
    }

    #[test]
    fn file_storage_round_trips_values() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        let mut storage = FileStorage::new(root.path().join("nested"));

        assert_eq!(storage.get("progress").expect("missing key reads"), None);

        storage
            .set("progress", "{\"score\":10}")
            .expect("write should create the directory");
        assert!(storage.root().join("progress.json").exists());
        assert_eq!(
            storage.get("progress").expect("key reads back"),
            Some("{\"score\":10}".to_string())
        );

        storage.remove("progress").expect("remove succeeds");
        storage.remove("progress").expect("removing twice is fine");
        assert_eq!(storage.get("progress").expect("removed key reads"), None);
    }

    #[test]
    fn file_storage_reports_unreadable_entries() {
        let root = tempfile::tempdir().expect("temporary directory should be created");
        fs::create_dir_all(root.path().join("progress.json"))
            .expect("directory in place of the file");
        let storage = FileStorage::new(root.path());

        let error = storage.get("progress").expect_err("directory cannot be read");
        assert!(matches!(error, StorageError::Read { ref key, .. } if key == "progress"));
    }
}
