//! Manager configuration with layered host policy
//!
//! Policy is read from two TOML files, later sources overriding earlier ones:
//! 1. User policy (`~/.extman/config.toml`)
//! 2. Workspace policy (`<workspace>/.extman/config.toml`)
//!
//! `trusted-folders` is honoured only from the user file so a workspace can
//! never vouch for itself.

use std::path::{Path, PathBuf};

use extman_fs::DocumentStore;
use extman_git::release::DEFAULT_GITHUB_API_URL;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Directory holding host state under the home directory and the workspace.
pub const CONFIG_DIR_NAME: &str = ".extman";
/// Policy file name inside [`CONFIG_DIR_NAME`].
pub const POLICY_FILENAME: &str = "config.toml";
const EXTENSIONS_DIR_NAME: &str = "extensions";
const ENABLEMENT_FILENAME: &str = "extension-enablement.json";
const SECRETS_FILENAME: &str = "extension-secrets.json";

/// Policy keys accepted in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_remote_extensions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trusted_folders: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reloading_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_api_url: Option<String>,
}

/// Effective configuration for an [`ExtensionManager`](crate::ExtensionManager).
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub home_dir: PathBuf,
    pub workspace_dir: PathBuf,
    /// Root holding one directory per installed extension.
    pub extensions_dir: PathBuf,
    pub enablement_path: PathBuf,
    pub secrets_path: PathBuf,
    pub allow_remote_extensions: bool,
    /// Regex patterns a source must match; empty allows everything.
    pub allowed_sources: Vec<String>,
    pub workspace_trusted: bool,
    /// Host cannot hot-reload extensions once a session is running.
    pub reloading_disabled: bool,
    pub github_api_url: String,
}

impl ManagerConfig {
    /// Defaults rooted at `home_dir`, with no policy files applied.
    pub fn new(home_dir: impl Into<PathBuf>, workspace_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        let state_dir = home_dir.join(CONFIG_DIR_NAME);
        Self {
            extensions_dir: state_dir.join(EXTENSIONS_DIR_NAME),
            enablement_path: state_dir.join(ENABLEMENT_FILENAME),
            secrets_path: state_dir.join(SECRETS_FILENAME),
            home_dir,
            workspace_dir: workspace_dir.into(),
            allow_remote_extensions: true,
            allowed_sources: Vec::new(),
            workspace_trusted: false,
            reloading_disabled: false,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }

    /// Defaults plus the user and workspace policy files.
    ///
    /// Missing files are skipped; malformed files are errors.
    pub fn load(home_dir: impl Into<PathBuf>, workspace_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config = Self::new(home_dir, workspace_dir);
        let store = DocumentStore::new();

        if let Some(user) = store.load_if_exists::<PolicyFile>(&config.user_policy_path())? {
            let trusted = user.trusted_folders.clone().unwrap_or_default();
            config.workspace_trusted = trusted
                .iter()
                .any(|folder| config.workspace_dir.starts_with(folder));
            config.apply(user);
        }

        let workspace_policy = config.workspace_dir.join(CONFIG_DIR_NAME).join(POLICY_FILENAME);
        if let Some(mut workspace) = store.load_if_exists::<PolicyFile>(&workspace_policy)? {
            if workspace.trusted_folders.take().is_some() {
                tracing::warn!(
                    path = %workspace_policy.display(),
                    "Ignoring trusted-folders in workspace policy"
                );
            }
            config.apply(workspace);
        }

        tracing::debug!(
            extensions_dir = %config.extensions_dir.display(),
            workspace_trusted = config.workspace_trusted,
            "Loaded extension manager configuration"
        );
        Ok(config)
    }

    fn apply(&mut self, policy: PolicyFile) {
        if let Some(allow) = policy.allow_remote_extensions {
            self.allow_remote_extensions = allow;
        }
        if let Some(sources) = policy.allowed_sources {
            self.allowed_sources = sources;
        }
        if let Some(disabled) = policy.reloading_disabled {
            self.reloading_disabled = disabled;
        }
        if let Some(url) = policy.github_api_url {
            self.github_api_url = url;
        }
    }

    pub fn user_policy_path(&self) -> PathBuf {
        self.home_dir.join(CONFIG_DIR_NAME).join(POLICY_FILENAME)
    }

    /// Permanent directory for an installed extension.
    pub fn extension_dir(&self, name: &str) -> PathBuf {
        self.extensions_dir.join(name)
    }

    /// Directory holding workspace-scoped settings for an extension.
    pub fn workspace_settings_dir(&self, name: &str) -> PathBuf {
        self.workspace_dir
            .join(CONFIG_DIR_NAME)
            .join(EXTENSIONS_DIR_NAME)
            .join(name)
    }
}

/// Record `folder` as trusted in the user policy file.
pub fn trust_folder(user_policy_path: &Path, folder: &Path) -> Result<()> {
    let store = DocumentStore::new();
    let mut policy = store
        .load_if_exists::<PolicyFile>(user_policy_path)?
        .unwrap_or_default();
    let folders = policy.trusted_folders.get_or_insert_with(Vec::new);
    if !folders.iter().any(|f| f == folder) {
        folders.push(folder.to_path_buf());
    }
    store.save(user_policy_path, &policy)?;
    Ok(())
}
