//! Key-value substrates for the local backend.
//!
//! A [`KeyValue`] is the string-keyed, string-valued storage a browser
//! exposes as local storage. [`MemoryKv`] keeps everything in process and can
//! enforce a byte quota; [`FileKv`] keeps one file per key on disk.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, StoreError};

/// Synchronous string storage.
pub trait KeyValue: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;

    /// Remove every key.
    fn clear(&self) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory key-value storage.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryKv {
    items: RwLock<HashMap<String, String>>,
    /// Maximum total size of keys and values, in bytes.
    quota: Option<usize>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once keys and values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            quota: Some(bytes),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> Result<usize> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Internal(format!("lock poisoned: {}", e))
}

impl KeyValue for MemoryKv {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;

        if let Some(quota) = self.quota {
            let others: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }

        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.clear();
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// On disk
// ─────────────────────────────────────────────────────────────────────────────

const FILE_EXTENSION: &str = "json";

/// Key-value storage with one `<key>.json` file per key.
///
/// Writes go to a temporary file that is renamed into place, so a crash never
/// leaves a half-written collection behind.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (and create if needed) a data directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidData(format!("invalid key `{}`", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

impl KeyValue for FileKv {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION) {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn exercise(kv: &dyn KeyValue) {
        assert_eq!(kv.get_item("users").unwrap(), None);

        kv.set_item("users", "[]").unwrap();
        kv.set_item("grades", "[1]").unwrap();
        assert_eq!(kv.get_item("users").unwrap().as_deref(), Some("[]"));

        kv.remove_item("users").unwrap();
        kv.remove_item("users").unwrap();
        assert_eq!(kv.get_item("users").unwrap(), None);

        kv.clear().unwrap();
        assert_eq!(kv.get_item("grades").unwrap(), None);
    }

    #[test]
    fn test_memory_kv() {
        exercise(&MemoryKv::new());
    }

    #[test]
    fn test_file_kv() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileKv::open(dir.path().join("data")).unwrap());
    }

    #[test]
    fn test_file_kv_persists() {
        let dir = tempfile::tempdir().unwrap();
        FileKv::open(dir.path()).unwrap().set_item("news", "[{}]").unwrap();

        let reopened = FileKv::open(dir.path()).unwrap();
        assert_eq!(reopened.get_item("news").unwrap().as_deref(), Some("[{}]"));
    }

    #[test]
    fn test_file_kv_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let kv = FileKv::open(dir.path()).unwrap();
        assert!(matches!(
            kv.set_item("../escape", "x"),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_quota() {
        let kv = MemoryKv::with_quota(16);
        kv.set_item("a", "0123456789").unwrap();

        let err = kv.set_item("b", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 22, quota: 16, .. }));

        // Replacing a value only counts the new size.
        kv.set_item("a", "01234567890123").unwrap();
        assert_eq!(kv.used_bytes().unwrap(), 15);
    }

    proptest! {
        #[test]
        fn test_quota_never_exceeded(
            writes in prop::collection::vec(("[a-d]", "[a-z]{0,24}"), 1..32),
        ) {
            let kv = MemoryKv::with_quota(48);
            for (key, value) in &writes {
                let _ = kv.set_item(key, value);
                prop_assert!(kv.used_bytes().unwrap() <= 48);
            }
        }
    }
}
