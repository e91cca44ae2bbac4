//! Persistence backends.
//!
//! Values are stored as JSON under string keys, the same shape the
//! extension keeps in `storage.local`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Key of the toggle state object.
pub const TOGGLE_STATE_KEY: &str = "bolFilterToggleState";
/// Key of the blocked sellers array.
pub const BLOCKED_SELLERS_KEY: &str = "bolFilterBlockedSellers";
/// Key of the blocked brands array.
pub const BLOCKED_BRANDS_KEY: &str = "bolFilterBlockedBrands";

/// A key-value store for persisted settings.
pub trait Storage {
    /// Read `key`. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Volatile storage, used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, Value>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `values`.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            values: RefCell::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage backed by a single JSON object on disk.
///
/// Every write rewrites the whole file. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value);
        let raw = serde_json::to_string_pretty(&Value::Object(map))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bol-filter-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_values([(BLOCKED_SELLERS_KEY, json!(["Acme"]))]);

        assert_eq!(storage.get(BLOCKED_SELLERS_KEY).unwrap(), Some(json!(["Acme"])));
        assert_eq!(storage.get(BLOCKED_BRANDS_KEY).unwrap(), None);

        storage.set(BLOCKED_BRANDS_KEY, json!([])).unwrap();
        assert_eq!(storage.get(BLOCKED_BRANDS_KEY).unwrap(), Some(json!([])));
    }

    #[test]
    fn test_json_file_storage_missing_file_is_empty() {
        let storage = JsonFileStorage::new(temp_path("missing"));

        assert_eq!(storage.get(TOGGLE_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn test_json_file_storage_keeps_other_keys() {
        let path = temp_path("keys");
        let storage = JsonFileStorage::new(&path);

        storage.set(BLOCKED_SELLERS_KEY, json!(["Acme"])).unwrap();
        storage.set(TOGGLE_STATE_KEY, json!({"filter-merkloos": false})).unwrap();

        let reopened = JsonFileStorage::new(&path);
        assert_eq!(reopened.get(BLOCKED_SELLERS_KEY).unwrap(), Some(json!(["Acme"])));
        assert_eq!(
            reopened.get(TOGGLE_STATE_KEY).unwrap(),
            Some(json!({"filter-merkloos": false}))
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_json_file_storage_rejects_non_object() {
        let path = temp_path("array");
        fs::write(&path, "[1, 2]").unwrap();
        let storage = JsonFileStorage::new(&path);

        assert!(matches!(storage.get(TOGGLE_STATE_KEY), Err(Error::Storage(_))));
        let _ = fs::remove_file(path);
    }
}
