use crate::error::{Error, Result};
use crate::model::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const STORAGE_KEY: &str = "musicListeningData2025";

pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|err| Error::storage(format!("failed to read {}: {err}", path.display())))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|err| {
            Error::storage(format!("failed to create {}: {err}", self.root.display()))
        })?;
        let path = self.path_for(key);
        backup_existing(&path);
        fs::write(&path, value)
            .map_err(|err| Error::storage(format!("failed to write {}: {err}", path.display())))
    }
}

fn backup_existing(path: &Path) {
    if path.exists() {
        let backup = path.with_extension("json.bak");
        let _ = fs::copy(path, &backup);
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            values: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .values
                .iter()
                .filter(|(existing, _)| existing.as_str() != key)
                .map(|(existing, stored)| existing.len() + stored.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(Error::storage(format!(
                    "storage quota of {quota} bytes exceeded"
                )));
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl LocalStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: impl StorageBackend + 'static, key: &str) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.to_string(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Stored entries, or an empty list when the slot is absent, unreadable
    /// or holds something that does not parse.
    pub fn load(&self) -> Vec<Entry> {
        let raw = match self.backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("error reading local store: {err}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Entry>>(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("error parsing local store {}: {err}", self.key);
                Vec::new()
            }
        }
    }

    pub fn save(&mut self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_string(entries)
            .map_err(|err| Error::storage(format!("failed to serialize entries: {err}")))?;
        match self.backend.write(&self.key, &json) {
            Ok(()) => {
                log::debug!("saved {} entries to local store", entries.len());
                Ok(())
            }
            Err(err) => {
                log::error!("error saving to local store: {err}");
                Err(err)
            }
        }
    }

    pub fn append(&mut self, entry: Entry) -> Result<()> {
        let mut entries = self.load();
        entries.push(entry);
        self.save(&entries)
    }

    pub fn recent_additions(&self, count: usize) -> Vec<Entry> {
        let entries = self.load();
        let start = entries.len().saturating_sub(count);
        entries[start..].iter().rev().cloned().collect()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.save(&[])
    }
}
