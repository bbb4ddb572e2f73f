//! Persisted enable/disable state per extension and scope path.
//!
//! File shape: `{ "<extension>": { "<absolute scope path>": true|false } }`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use extman_fs::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scope passed to enable/disable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnablementScope {
    User,
    Workspace,
    /// Current process only, never persisted.
    Session,
    System,
    SystemDefaults,
}

impl EnablementScope {
    /// Whether enable/disable may target this scope.
    pub fn is_settable(self) -> bool {
        matches!(self, Self::User | Self::Workspace | Self::Session)
    }
}

impl fmt::Display for EnablementScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Workspace => write!(f, "workspace"),
            Self::Session => write!(f, "session"),
            Self::System => write!(f, "system"),
            Self::SystemDefaults => write!(f, "system-defaults"),
        }
    }
}

impl FromStr for EnablementScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "workspace" => Ok(Self::Workspace),
            "session" => Ok(Self::Session),
            "system" => Ok(Self::System),
            "system-defaults" | "systemdefaults" => Ok(Self::SystemDefaults),
            _ => Err(Error::InvalidScope {
                scope: s.to_string(),
            }),
        }
    }
}

/// One stored override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnablementRecord {
    pub extension_name: String,
    pub scope_path: PathBuf,
    pub enabled: bool,
}

type Records = BTreeMap<String, BTreeMap<String, bool>>;

#[derive(Debug, Clone)]
pub struct EnablementStore {
    path: PathBuf,
    records: Records,
}

impl EnablementStore {
    /// Load the store, treating a missing file as empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = DocumentStore::new()
            .load_if_exists::<Records>(&path)?
            .unwrap_or_default();
        Ok(Self { path, records })
    }

    /// Effective state of `name` for `path`.
    ///
    /// Walks from `path` up through its ancestors and takes the first record
    /// found, so a workspace record beats one for the home directory above
    /// it. If `home` is not an ancestor its record is consulted last.
    /// Extensions are enabled when nothing is recorded.
    pub fn is_enabled(&self, name: &str, path: &Path, home: &Path) -> bool {
        let Some(scopes) = self.records.get(name) else {
            return true;
        };
        for ancestor in path.ancestors() {
            if let Some(enabled) = scopes.get(&key(ancestor)) {
                return *enabled;
            }
        }
        scopes.get(&key(home)).copied().unwrap_or(true)
    }

    /// Record `enabled` for (`name`, `scope_path`) and persist. Last write wins.
    pub fn set(&mut self, name: &str, scope_path: &Path, enabled: bool) -> Result<()> {
        self.records
            .entry(name.to_string())
            .or_default()
            .insert(key(scope_path), enabled);
        self.save()
    }

    /// Forget every record for `name`.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if self.records.remove(name).is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn records(&self, name: &str) -> Vec<EnablementRecord> {
        self.records
            .get(name)
            .map(|scopes| {
                scopes
                    .iter()
                    .map(|(scope_path, enabled)| EnablementRecord {
                        extension_name: name.to_string(),
                        scope_path: PathBuf::from(scope_path),
                        enabled: *enabled,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn save(&self) -> Result<()> {
        DocumentStore::new().save(&self.path, &self.records)?;
        Ok(())
    }
}

fn key(path: &Path) -> String {
    path.display().to_string()
}
