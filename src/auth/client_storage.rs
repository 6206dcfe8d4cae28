//! Durable client-side key-value storage.
//!
//! `FileStorage` keeps a flat JSON object on disk so the CLI can restore its
//! session across runs:
//!
//! ```text
//! <DATA_DIR>/client_state.json
//! { "current_user": "{\"user\":{...},\"token\":\"...\"}" }
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientStorageError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("Corrupt client state in {}: {1}", .0.display())]
    Corrupt(PathBuf, #[source] serde_json::Error),
}

/// String key-value store that survives process restarts.
pub trait ClientStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientStorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientStorageError>;
    fn remove(&mut self, key: &str) -> Result<(), ClientStorageError>;
}

/// In-process storage; contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientStorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientStorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientStorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON-file storage under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub const FILENAME: &'static str = "client_state.json";

    /// Storage backed by `<data_dir>/client_state.json`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, ClientStorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| ClientStorageError::Corrupt(self.path.clone(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ClientStorageError::Io(self.path.clone(), e)),
        }
    }

    /// Loads the map, starting over if the file is unreadable JSON.
    fn load_for_write(&self) -> Result<HashMap<String, String>, ClientStorageError> {
        match self.load() {
            Err(ClientStorageError::Corrupt(path, e)) => {
                tracing::warn!("Discarding corrupt client state {}: {}", path.display(), e);
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), ClientStorageError> {
        let io_err = |e: io::Error| ClientStorageError::Io(self.path.clone(), e);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(values)
            .map_err(|e| ClientStorageError::Corrupt(self.path.clone(), e))?;

        // Write to a sibling, then rename over the real file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientStorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientStorageError> {
        let mut values = self.load_for_write()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientStorageError> {
        let mut values = self.load_for_write()?;
        if values.remove(key).is_some() || self.path.exists() {
            self.save(&values)?;
        }
        Ok(())
    }
}
