//! Storage for sensitive setting values.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use extman_fs::DocumentStore;

use crate::error::{Error, Result};

/// Key-value secret storage, partitioned by service name.
pub trait SecretStore: Send + Sync {
    fn get(&self, service: &str, key: &str) -> Result<Option<String>>;
    fn set(&self, service: &str, key: &str, value: &str) -> Result<()>;
    fn delete(&self, service: &str, key: &str) -> Result<()>;
}

type Secrets = BTreeMap<String, BTreeMap<String, String>>;

/// In-process secret store.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<Secrets>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<String>> {
        let secrets = self.secrets.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        Ok(secrets.get(service).and_then(|keys| keys.get(key)).cloned())
    }

    fn set(&self, service: &str, key: &str, value: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        secrets
            .entry(service.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, key: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        if let Some(keys) = secrets.get_mut(service) {
            keys.remove(key);
            if keys.is_empty() {
                secrets.remove(service);
            }
        }
        Ok(())
    }
}

/// Secret store backed by a JSON file readable only by the owner.
///
/// Every operation re-reads the file so separate processes see each
/// other's writes.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
    store: DocumentStore,
    guard: Mutex<()>,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: DocumentStore::new(),
            guard: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Secrets> {
        Ok(self.store.load_if_exists(&self.path)?.unwrap_or_default())
    }
}

impl SecretStore for FileSecretStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<String>> {
        let _guard = self.guard.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        Ok(self
            .read()?
            .get(service)
            .and_then(|keys| keys.get(key))
            .cloned())
    }

    fn set(&self, service: &str, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        let mut secrets = self.read()?;
        secrets
            .entry(service.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.store.save_private(&self.path, &secrets)?;
        Ok(())
    }

    fn delete(&self, service: &str, key: &str) -> Result<()> {
        let _guard = self.guard.lock().map_err(|e| Error::SecretStore(e.to_string()))?;
        let mut secrets = self.read()?;
        let Some(keys) = secrets.get_mut(service) else {
            return Ok(());
        };
        if keys.remove(key).is_none() {
            return Ok(());
        }
        if keys.is_empty() {
            secrets.remove(service);
        }
        self.store.save_private(&self.path, &secrets)?;
        Ok(())
    }
}
