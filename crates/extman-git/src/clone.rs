//! Git clone operations for extension installation

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;

use crate::error::{Error, Result};

/// Clone a git repository to a destination directory.
///
/// `dest` must be empty or absent. When `reference` is given it is resolved
/// as a local name first and as `origin/<reference>` second, and HEAD is
/// detached at the resolved commit.
pub fn clone_repo_blocking(url: &str, dest: &Path, reference: Option<&str>) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::Clone {
            url: url.to_string(),
            message: format!("Failed to create directory: {}", e),
        })?;
    }

    let repo = RepoBuilder::new()
        .clone(url, dest)
        .map_err(|e| Error::Clone {
            url: url.to_string(),
            message: e.message().to_string(),
        })?;

    let Some(reference) = reference else {
        return Ok(());
    };

    let object = repo
        .revparse_single(reference)
        .or_else(|_| repo.revparse_single(&format!("origin/{reference}")))
        .map_err(|_| Error::RefNotFound {
            url: url.to_string(),
            reference: reference.to_string(),
        })?;

    repo.checkout_tree(&object, None)?;
    let commit = object.peel_to_commit()?;
    repo.set_head_detached(commit.id())?;

    tracing::debug!(url = %url, reference = %reference, commit = %commit.id(), "Checked out ref");
    Ok(())
}

/// Clone on the blocking pool so the async runtime is not stalled by git2.
pub async fn clone_repo(url: &str, dest: &Path, reference: Option<&str>) -> Result<()> {
    let url = url.to_string();
    let dest: PathBuf = dest.to_path_buf();
    let reference = reference.map(str::to_string);

    tokio::task::spawn_blocking(move || clone_repo_blocking(&url, &dest, reference.as_deref()))
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}
