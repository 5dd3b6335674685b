//! Durable key-value string storage for the remembered selection.

use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;

/// String store that survives restarts.
pub trait KeyValueStore: Send + Sync {
    /// Read `key`, returning `None` when it was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JSON object on disk, rewritten whole on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Store backed by `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if let Some(entries) = self.cache.read().as_ref() {
            return Ok(entries.clone());
        }
        let entries = if self.path.exists() {
            let contents = fs::read_to_string(&self.path)
                .with_context(|| format!("failed to read {}", self.path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", self.path.display()))?
        } else {
            BTreeMap::new()
        };
        *self.cache.write() = Some(entries.clone());
        Ok(entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized =
            serde_json::to_string_pretty(entries).context("failed to serialize stored values")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)?;
        *self.cache.write() = Some(entries);
        Ok(())
    }
}

/// Process-local store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/state.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get("insightiq_domain")?, None);
        store.set("insightiq_domain", "fintech")?;
        store.set("other", "value")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("insightiq_domain")?.as_deref(), Some("fintech"));
        assert_eq!(reopened.get("other")?.as_deref(), Some("value"));
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json")?;
        assert!(FileStore::new(&path).get("insightiq_domain").is_err());
        Ok(())
    }
}
