//! Format-agnostic document loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Loads and saves serde documents, detecting the format from the file
/// extension.
///
/// - `.json` -> JSON
/// - `.toml` -> TOML
///
/// Saves always go through [`io::write_atomic`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        Self::parse(path, &content)
    }

    /// Load a document, returning `None` when the file does not exist.
    pub fn load_if_exists<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match io::read_text_if_exists(path)? {
            Some(content) => Self::parse(path, &content).map(Some),
            None => Ok(None),
        }
    }

    /// Save a document atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = Self::render(path, value)?;
        io::write_atomic(path, content.as_bytes())
    }

    /// Save a document atomically with owner-only permissions.
    pub fn save_private<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = Self::render(path, value)?;
        io::write_private(path, content.as_bytes())
    }

    fn extension(path: &Path) -> String {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
        match Self::extension(path).as_str() {
            "json" => serde_json::from_str(content).map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(content).map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    fn render<T: Serialize>(path: &Path, value: &T) -> Result<String> {
        match Self::extension(path).as_str() {
            "json" => serde_json::to_string_pretty(value).map_err(|e| Error::Serialize {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "toml" => toml::to_string_pretty(value).map_err(|e| Error::Serialize {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            other => Err(Error::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}
