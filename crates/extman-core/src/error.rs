//! Error types for extman-core

use std::path::PathBuf;

/// Result type for extman-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Refused by policy: remote installs, allow-list, workspace trust, consent.
    PolicyViolation,
    /// Extension, manifest or source does not exist.
    NotFound,
    /// Install of an existing extension, or update of a missing one.
    Conflict,
    /// Manifest, metadata or argument failed validation.
    Validation,
    /// Clone or download failure.
    Transport,
    /// Local I/O or serialization failure.
    Internal,
}

/// Errors that can occur in extension lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `load_extensions` may only run once per manager.
    #[error("Extensions have already been loaded")]
    AlreadyLoaded,

    #[error("Installing extensions from remote sources is disallowed by policy ({location})")]
    RemoteInstallsDisallowed { location: String },

    #[error("Extension source '{location}' is not in the allowed sources list")]
    SourceNotAllowed { location: String },

    #[error("Workspace {path} is not trusted; extensions cannot be installed from it")]
    WorkspaceNotTrusted { path: PathBuf },

    #[error("Installation cancelled: consent for {action} was declined")]
    ConsentDeclined { action: String },

    #[error("Extension source not found: {location}")]
    SourceNotFound { location: String },

    #[error("Extension manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid extension manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Invalid hooks file at {path}: {reason}")]
    InvalidHooks { path: PathBuf, reason: String },

    #[error("Invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid install metadata: {reason}")]
    InvalidInstallMetadata { reason: String },

    #[error("Extension '{name}' not found")]
    ExtensionNotFound { name: String },

    #[error("Extension '{name}' is already installed at {path}; uninstall it first")]
    AlreadyInstalled { name: String, path: PathBuf },

    #[error("Cannot update extension '{name}': it is not installed")]
    NotInstalled { name: String },

    #[error("Scope '{scope}' cannot be used to enable or disable extensions")]
    InvalidScope { scope: String },

    #[error("Extension '{extension}' does not declare setting '{setting}'")]
    UnknownSetting { extension: String, setting: String },

    #[error("Secret store error: {0}")]
    SecretStore(String),

    #[error("Background task failed: {0}")]
    Task(String),

    /// Filesystem error from extman-fs
    #[error(transparent)]
    Fs(#[from] extman_fs::Error),

    /// Clone or download error from extman-git
    #[error(transparent)]
    Git(#[from] extman_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error for callers that only need the broad category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RemoteInstallsDisallowed { .. }
            | Self::SourceNotAllowed { .. }
            | Self::WorkspaceNotTrusted { .. }
            | Self::ConsentDeclined { .. } => ErrorKind::PolicyViolation,
            Self::SourceNotFound { .. }
            | Self::ManifestNotFound { .. }
            | Self::ExtensionNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyInstalled { .. } | Self::NotInstalled { .. } | Self::AlreadyLoaded => {
                ErrorKind::Conflict
            }
            Self::InvalidManifest { .. }
            | Self::InvalidHooks { .. }
            | Self::InvalidName { .. }
            | Self::InvalidInstallMetadata { .. }
            | Self::InvalidScope { .. }
            | Self::UnknownSetting { .. } => ErrorKind::Validation,
            Self::Git(_) => ErrorKind::Transport,
            Self::Fs(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::SecretStore(_) | Self::Task(_) | Self::Fs(_) | Self::Io(_) | Self::Json(_) => {
                ErrorKind::Internal
            }
        }
    }
}
