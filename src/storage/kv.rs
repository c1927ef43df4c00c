use std::collections::HashMap as StdHashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::StorageError;

const SNAPSHOT_VERSION: u32 = 1;

/// Durable string key-value storage backing the session.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Short label for logs.
    fn kind(&self) -> &'static str;
}

/// Process-local map; never fails and forgets everything on exit.
#[derive(Default)]
pub struct MemoryKv {
    map: parking_lot::RwLock<StdHashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self { Self::default() }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { Ok(self.map.read().get(key).cloned()) }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.map.write().remove(key);
        Ok(())
    }
    fn kind(&self) -> &'static str { "memory" }
}

/// Backend for contexts with no durable storage at all. Every call fails.
#[derive(Debug, Clone, Default)]
pub struct UnavailableKv {
    pub reason: String,
}

impl UnavailableKv {
    pub fn new(reason: impl Into<String>) -> Self { Self { reason: reason.into() } }
}

impl KvBackend for UnavailableKv {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> { Err(StorageError::Unavailable(self.reason.clone())) }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> { Err(StorageError::Unavailable(self.reason.clone())) }
    fn remove(&self, _key: &str) -> Result<(), StorageError> { Err(StorageError::Unavailable(self.reason.clone())) }
    fn kind(&self) -> &'static str { "unavailable" }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct StoreSettings {
    pub name: String,
    /// Snapshot format; only "bincode" is understood.
    #[serde(default = "StoreSettings::default_format")]
    pub format: String,
}

impl StoreSettings {
    fn default_format() -> String { "bincode".to_string() }
}

impl Default for StoreSettings {
    fn default() -> Self { Self { name: String::new(), format: Self::default_format() } }
}

#[derive(Serialize, Deserialize)]
struct SnapEntry { key: String, value: String }

#[derive(Serialize, Deserialize)]
struct Snapshot { version: u32, created_ms: i64, entries: Vec<SnapEntry> }

/// Directory-backed store: `store.json` holds settings, `snapshot.bin` holds every
/// entry and is rewritten on each mutation.
pub struct FileKv {
    settings: StoreSettings,
    dir: PathBuf,
    map: parking_lot::RwLock<StdHashMap<String, String>>,
}

impl FileKv {
    /// Open (or create) the store under `dir`, loading any existing snapshot.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let mut settings = StoreSettings { name: name.to_string(), ..Default::default() };
        let cfg = dir.join("store.json");
        if let Ok(bytes) = std::fs::read(&cfg) {
            settings = serde_json::from_slice::<StoreSettings>(&bytes).map_err(|e| StorageError::Snapshot(format!("store.json: {}", e)))?;
        } else {
            std::fs::write(&cfg, serde_json::to_vec_pretty(&settings).unwrap_or_default())?;
        }
        if settings.format != "bincode" {
            return Err(StorageError::Snapshot(format!("unsupported snapshot format '{}'", settings.format)));
        }
        let kv = Self { settings, dir, map: parking_lot::RwLock::new(StdHashMap::new()) };
        kv.load_snapshot()?;
        Ok(kv)
    }

    pub fn settings(&self) -> &StoreSettings { &self.settings }
    pub fn dir(&self) -> &Path { &self.dir }
    fn snapshot_path(&self) -> PathBuf { self.dir.join("snapshot.bin") }

    fn load_snapshot(&self) -> Result<(), StorageError> {
        let path = self.snapshot_path();
        if !path.exists() { return Ok(()); }
        let bytes = std::fs::read(&path)?;
        let snap: Snapshot = bincode::deserialize(&bytes).map_err(|e| StorageError::Snapshot(e.to_string()))?;
        if snap.version != SNAPSHOT_VERSION {
            return Err(StorageError::Snapshot(format!("unsupported snapshot version {}", snap.version)));
        }
        let mut w = self.map.write();
        w.clear();
        for e in snap.entries { w.insert(e.key, e.value); }
        Ok(())
    }

    /// Callers hold the map write guard for the whole save, so snapshots never
    /// race on the shared `.tmp` file and disk always matches the map.
    fn save_snapshot(&self, map: &StdHashMap<String, String>) -> Result<(), StorageError> {
        let created_ms = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or(0);
        let entries = map.iter().map(|(k, v)| SnapEntry { key: k.clone(), value: v.clone() }).collect();
        let snap = Snapshot { version: SNAPSHOT_VERSION, created_ms, entries };
        let bytes = bincode::serialize(&snap).map_err(|e| StorageError::Snapshot(e.to_string()))?;
        let tmp = self.snapshot_path().with_extension("bin.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(tmp, self.snapshot_path())?;
        Ok(())
    }
}

impl KvBackend for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { Ok(self.map.read().get(key).cloned()) }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut w = self.map.write();
        w.insert(key.to_string(), value.to_string());
        self.save_snapshot(&w)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut w = self.map.write();
        if w.remove(key).is_none() { return Ok(()); }
        self.save_snapshot(&w)
    }

    fn kind(&self) -> &'static str { "file" }
}
