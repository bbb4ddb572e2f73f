//! Install provenance: the persisted sidecar and its typed form.
//!
//! [`InstallMetadata`] is the wire shape of `.gemini-extension-install.json`.
//! [`InstallSource`] is the validated sum type the manager works with; each
//! variant carries only the fields meaningful for that kind of source.

use std::fmt;
use std::path::{Path, PathBuf};

use extman_fs::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::INSTALL_METADATA_FILENAME;

/// Kind of install source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallType {
    Local,
    Link,
    Git,
    GithubRelease,
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Link => write!(f, "link"),
            Self::Git => write!(f, "git"),
            Self::GithubRelease => write!(f, "github-release"),
        }
    }
}

/// Install metadata sidecar, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallMetadata {
    pub source: String,
    #[serde(rename = "type")]
    pub install_type: InstallType,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_pre_release: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_tag: Option<String>,
}

impl InstallMetadata {
    pub fn new(install_type: InstallType, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            install_type,
            reference: None,
            auto_update: None,
            allow_pre_release: None,
            release_tag: None,
        }
    }

    /// Build metadata for a user-supplied source string.
    ///
    /// URLs become git installs, anything else a local path.
    pub fn from_source(source: &str) -> Self {
        let install_type = if is_remote_source(source) {
            InstallType::Git
        } else {
            InstallType::Local
        };
        Self::new(install_type, source)
    }

    pub fn with_ref(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = Some(auto_update);
        self
    }

    pub fn with_pre_release(mut self, allow: bool) -> Self {
        self.allow_pre_release = Some(allow);
        self
    }

    /// Read the sidecar from an installed extension directory.
    ///
    /// Returns `None` when the directory has no sidecar.
    pub fn load(extension_dir: &Path) -> Result<Option<Self>> {
        let path = extension_dir.join(INSTALL_METADATA_FILENAME);
        Ok(DocumentStore::new().load_if_exists(&path)?)
    }

    /// Atomically write the sidecar into `extension_dir`.
    pub fn save(&self, extension_dir: &Path) -> Result<()> {
        let path = extension_dir.join(INSTALL_METADATA_FILENAME);
        DocumentStore::new().save(&path, self)?;
        Ok(())
    }
}

/// Whether `source` names a remote location (`http://`, `https://`,
/// `git@`, `sso://`).
pub fn is_remote_source(source: &str) -> bool {
    ["http://", "https://", "git@", "sso://"]
        .iter()
        .any(|prefix| source.starts_with(prefix))
}

/// Validated install source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// Files copied from a local directory.
    Local { path: PathBuf },
    /// Files left in place at a local directory.
    Link { path: PathBuf },
    Git {
        url: String,
        reference: Option<String>,
        auto_update: bool,
        allow_pre_release: bool,
    },
    GitHubRelease {
        url: String,
        reference: Option<String>,
        release_tag: Option<String>,
        auto_update: bool,
        allow_pre_release: bool,
    },
}

impl InstallSource {
    pub fn install_type(&self) -> InstallType {
        match self {
            Self::Local { .. } => InstallType::Local,
            Self::Link { .. } => InstallType::Link,
            Self::Git { .. } => InstallType::Git,
            Self::GitHubRelease { .. } => InstallType::GithubRelease,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Git { .. } | Self::GitHubRelease { .. })
    }

    /// Raw source string: a path for local sources, a URL otherwise.
    pub fn location(&self) -> String {
        match self {
            Self::Local { path } | Self::Link { path } => path.display().to_string(),
            Self::Git { url, .. } | Self::GitHubRelease { url, .. } => url.clone(),
        }
    }

    pub fn auto_update(&self) -> bool {
        match self {
            Self::Git { auto_update, .. } | Self::GitHubRelease { auto_update, .. } => *auto_update,
            Self::Local { .. } | Self::Link { .. } => false,
        }
    }
}

impl TryFrom<InstallMetadata> for InstallSource {
    type Error = Error;

    fn try_from(metadata: InstallMetadata) -> Result<Self> {
        if metadata.source.trim().is_empty() {
            return Err(Error::InvalidInstallMetadata {
                reason: "source must not be empty".to_string(),
            });
        }

        match metadata.install_type {
            InstallType::Local | InstallType::Link => {
                if metadata.reference.is_some() || metadata.auto_update.is_some() {
                    return Err(Error::InvalidInstallMetadata {
                        reason: format!(
                            "'ref' and 'autoUpdate' are not valid for {} sources",
                            metadata.install_type
                        ),
                    });
                }
                let path = PathBuf::from(metadata.source);
                Ok(if metadata.install_type == InstallType::Link {
                    Self::Link { path }
                } else {
                    Self::Local { path }
                })
            }
            InstallType::Git => Ok(Self::Git {
                url: metadata.source,
                reference: metadata.reference,
                auto_update: metadata.auto_update.unwrap_or(false),
                allow_pre_release: metadata.allow_pre_release.unwrap_or(false),
            }),
            InstallType::GithubRelease => Ok(Self::GitHubRelease {
                url: metadata.source,
                reference: metadata.reference,
                release_tag: metadata.release_tag,
                auto_update: metadata.auto_update.unwrap_or(false),
                allow_pre_release: metadata.allow_pre_release.unwrap_or(false),
            }),
        }
    }
}

impl From<&InstallSource> for InstallMetadata {
    fn from(source: &InstallSource) -> Self {
        let flag = |value: bool| value.then_some(true);
        match source {
            InstallSource::Local { path } => Self::new(InstallType::Local, path.display().to_string()),
            InstallSource::Link { path } => Self::new(InstallType::Link, path.display().to_string()),
            InstallSource::Git {
                url,
                reference,
                auto_update,
                allow_pre_release,
            } => Self {
                source: url.clone(),
                install_type: InstallType::Git,
                reference: reference.clone(),
                auto_update: flag(*auto_update),
                allow_pre_release: flag(*allow_pre_release),
                release_tag: None,
            },
            InstallSource::GitHubRelease {
                url,
                reference,
                release_tag,
                auto_update,
                allow_pre_release,
            } => Self {
                source: url.clone(),
                install_type: InstallType::GithubRelease,
                reference: reference.clone(),
                auto_update: flag(*auto_update),
                allow_pre_release: flag(*allow_pre_release),
                release_tag: release_tag.clone(),
            },
        }
    }
}
