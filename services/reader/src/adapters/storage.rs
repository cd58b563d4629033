//! services/reader/src/adapters/storage.rs
//!
//! Adapters implementing the `SessionStorage` port: a JSON file that plays the
//! role of browser local storage, and an in-memory map for tests and
//! throwaway sessions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use auraread_core::ports::{PortError, PortResult, SessionStorage};
use tracing::debug;

pub const SESSION_FILE_NAME: &str = "session.json";

/// Key holding the opaque auth token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-serialized user object.
pub const USER_KEY: &str = "user";

type Items = BTreeMap<String, String>;

fn lock_error<T>(_: T) -> PortError {
    PortError::Unexpected("session storage lock poisoned".to_string())
}

//=========================================================================================
// File-backed Storage
//=========================================================================================

/// Stores items as a flat JSON object in `<dir>/session.json`.
pub struct FileSessionStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileSessionStorage {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(SESSION_FILE_NAME),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_items(&self) -> PortResult<Items> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Items::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                PortError::Unexpected(format!(
                    "Corrupt session file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    fn write_items(&self, items: &Items) -> PortResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| PortError::Unexpected(e.to_string()))?;
        debug!("Wrote session storage to {}", self.path.display());
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.guard.lock().map_err(lock_error)?;
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.guard.lock().map_err(lock_error)?;
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn remove_item(&self, key: &str) -> PortResult<()> {
        let _guard = self.guard.lock().map_err(lock_error)?;
        let mut items = self.read_items()?;
        if items.remove(key).is_some() {
            self.write_items(&items)?;
        }
        Ok(())
    }
}

//=========================================================================================
// In-memory Storage
//=========================================================================================

#[derive(Default)]
pub struct MemorySessionStorage {
    items: Mutex<Items>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.items.lock().map_err(lock_error)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
        self.items
            .lock()
            .map_err(lock_error)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> PortResult<()> {
        self.items.lock().map_err(lock_error)?.remove(key);
        Ok(())
    }
}
