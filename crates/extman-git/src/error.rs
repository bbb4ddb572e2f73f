//! Error types for extman-git

use std::path::PathBuf;

/// Result type for extman-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching extension sources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] extman_fs::Error),

    #[error("Failed to clone git repository {url}: {message}")]
    Clone { url: String, message: String },

    #[error("Ref '{reference}' not found in {url}")]
    RefNotFound { url: String, reference: String },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("No release found for {repo}")]
    ReleaseNotFound { repo: String },

    #[error("Failed to extract archive into {path}: {message}")]
    Extract { path: PathBuf, message: String },

    #[error("Background task failed: {0}")]
    Task(String),
}
