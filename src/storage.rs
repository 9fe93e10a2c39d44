//! Local persistence.
//!
//! Chat state is kept in a handful of named entries in a key/value store,
//! each holding one JSON document.  Entries are read once at startup and
//! overwritten on every relevant mutation.  There is no schema version:
//! an entry that no longer parses is reported to the caller, which treats
//! it as empty.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Entry holding the serialized turn list.
pub const TURNS_KEY: &str = "gemchat.turns";

/// Entry holding the serialized prompt history.
pub const PROMPT_HISTORY_KEY: &str = "gemchat.prompt_history";

/// Entry holding the side panel's expanded flag.
pub const SIDEBAR_EXPANDED_KEY: &str = "gemchat.sidebar_expanded";

/// A string-to-string store.
pub trait KeyValueStore: Send {
    /// Returns the value for `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the value for `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Reads and deserializes the JSON document stored under `key`.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw).map(Some).map_err(|err| {
        Error::serialization(
            format!("failed to parse stored entry {key}: {err}"),
            Some(Box::new(err)),
        )
    })
}

/// Serializes `value` and stores it under `key`.
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

//////////////////////////////////////////// FileStore ////////////////////////////////////////////

/// One file per key under a directory.
///
/// Writes go to a temporary file that is renamed over the entry, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`.  The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(Error::validation(
                format!("invalid storage key {key:?}"),
                Some("key".to_string()),
            ));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io(format!("failed to read {}", path.display()), err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        fs::create_dir_all(&self.dir).map_err(|err| {
            Error::io(format!("failed to create {}", self.dir.display()), err)
        })?;
        let tmp = path.with_extension("json.tmp");
        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|err| Error::io(format!("failed to write {}", path.display()), err))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::io(
                format!("failed to remove {}", path.display()),
                err,
            )),
        }
    }
}

/////////////////////////////////////////// MemoryStore ///////////////////////////////////////////

/// An in-memory store.
///
/// Clones share the same entries, so a clone handed to a second chat store
/// behaves like reopening the same storage after a reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned(key: &str) -> Error {
        Error::storage("memory store lock poisoned", Some(key.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned(key))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip_and_sharing() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set("a", "1").unwrap();
        let reopened = store.clone();
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn json_helpers() {
        let mut store = MemoryStore::new();
        assert_eq!(load_json::<Vec<String>, _>(&store, PROMPT_HISTORY_KEY).unwrap(), None);

        let history = vec!["one".to_string(), "two".to_string()];
        save_json(&mut store, PROMPT_HISTORY_KEY, &history).unwrap();
        assert_eq!(
            store.get(PROMPT_HISTORY_KEY).unwrap().as_deref(),
            Some(r#"["one","two"]"#)
        );
        let loaded: Option<Vec<String>> = load_json(&store, PROMPT_HISTORY_KEY).unwrap();
        assert_eq!(loaded, Some(history));
    }

    #[test]
    fn unparseable_entry_is_serialization_error() {
        let mut store = MemoryStore::new();
        store.set(TURNS_KEY, "{not json").unwrap();
        let err = load_json::<Vec<String>, _>(&store, TURNS_KEY).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(err.to_string().contains(TURNS_KEY));
    }

    #[test]
    fn blank_entry_reads_as_missing() {
        let mut store = MemoryStore::new();
        store.set(TURNS_KEY, "  ").unwrap();
        assert_eq!(load_json::<Vec<String>, _>(&store, TURNS_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("state");
        let mut store = FileStore::new(&root);
        assert_eq!(store.get(TURNS_KEY).unwrap(), None);

        store.set(TURNS_KEY, "[]").unwrap();
        assert!(root.join("gemchat.turns.json").exists());
        assert!(!root.join("gemchat.turns.json.tmp").exists());

        let reopened = FileStore::new(&root);
        assert_eq!(reopened.get(TURNS_KEY).unwrap().as_deref(), Some("[]"));

        store.set(TURNS_KEY, "[1]").unwrap();
        assert_eq!(reopened.get(TURNS_KEY).unwrap().as_deref(), Some("[1]"));

        store.remove(TURNS_KEY).unwrap();
        store.remove(TURNS_KEY).unwrap();
        assert_eq!(reopened.get(TURNS_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = store.set(key, "x").unwrap_err();
            assert!(err.is_validation(), "{key:?}");
        }
    }
}
