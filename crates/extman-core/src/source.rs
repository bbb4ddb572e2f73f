//! Install source policy checks and materialization.

use std::path::{Path, PathBuf};

use extman_git::{GitHubRepo, ReleaseClient};
use regex::Regex;

use crate::error::{Error, Result};
use crate::host::ConsentPrompter;
use crate::install::InstallSource;

const RELEASE_DIR: &str = "release";
const CLONE_DIR: &str = "clone";

/// Whether `source` matches at least one allow-list pattern.
///
/// An empty list allows everything. A pattern that fails to compile is
/// treated as non-matching.
pub fn is_allowed_extension_source(source: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    patterns.iter().any(|pattern| match Regex::new(pattern) {
        Ok(re) => re.is_match(source),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "Ignoring invalid allowed-sources pattern");
            false
        }
    })
}

/// Extension files ready to be validated and installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Directory holding the extension root.
    pub dir: PathBuf,
    /// Source as it was actually fetched. A GitHub source may switch between
    /// git and release installs here.
    pub source: InstallSource,
}

/// Resolves install sources and fetches their files.
#[derive(Debug, Clone)]
pub struct InstallSourceResolver {
    workspace_dir: PathBuf,
    releases: ReleaseClient,
}

impl InstallSourceResolver {
    pub fn new(workspace_dir: impl Into<PathBuf>, github_api_url: &str) -> Result<Self> {
        Ok(Self {
            workspace_dir: workspace_dir.into(),
            releases: ReleaseClient::new(github_api_url)?,
        })
    }

    /// Make local and link paths absolute, relative to the workspace.
    ///
    /// Remote sources pass through unchanged.
    pub fn resolve(&self, source: InstallSource) -> Result<InstallSource> {
        match source {
            InstallSource::Local { path } => Ok(InstallSource::Local {
                path: self.resolve_path(&path)?,
            }),
            InstallSource::Link { path } => Ok(InstallSource::Link {
                path: self.resolve_path(&path)?,
            }),
            remote => Ok(remote),
        }
    }

    fn resolve_path(&self, path: &Path) -> Result<PathBuf> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_dir.join(path)
        };
        dunce::canonicalize(&joined).map_err(|_| Error::SourceNotFound {
            location: path.display().to_string(),
        })
    }

    /// Fetch the files for `source` into `staging`.
    ///
    /// Local and link sources are used in place. For GitHub URLs a release
    /// download is tried first. If that fails, a git source silently falls
    /// back to a clone; a release source asks `prompter` before cloning.
    pub async fn materialize(
        &self,
        source: &InstallSource,
        staging: &Path,
        prompter: &dyn ConsentPrompter,
    ) -> Result<Materialized> {
        match source {
            InstallSource::Local { path } | InstallSource::Link { path } => {
                if !path.is_dir() {
                    return Err(Error::SourceNotFound {
                        location: path.display().to_string(),
                    });
                }
                Ok(Materialized {
                    dir: path.clone(),
                    source: source.clone(),
                })
            }
            InstallSource::Git {
                url,
                reference,
                auto_update,
                allow_pre_release,
            } => {
                if let Some(repo) = GitHubRepo::parse(url) {
                    let release_dir = staging.join(RELEASE_DIR);
                    match self
                        .releases
                        .download_release(&repo, reference.as_deref(), *allow_pre_release, &release_dir)
                        .await
                    {
                        Ok(release) => {
                            tracing::info!(repo = %repo, tag = %release.tag_name, "Installed from GitHub release");
                            return Ok(Materialized {
                                dir: release_dir,
                                source: InstallSource::GitHubRelease {
                                    url: url.clone(),
                                    reference: reference.clone(),
                                    release_tag: Some(release.tag_name),
                                    auto_update: *auto_update,
                                    allow_pre_release: *allow_pre_release,
                                },
                            });
                        }
                        Err(e) => {
                            tracing::debug!(repo = %repo, error = %e, "No usable release, cloning instead");
                        }
                    }
                }
                let dir = self.clone_into(url, reference.as_deref(), staging).await?;
                Ok(Materialized {
                    dir,
                    source: source.clone(),
                })
            }
            InstallSource::GitHubRelease {
                url,
                reference,
                auto_update,
                allow_pre_release,
                ..
            } => {
                let repo = GitHubRepo::parse(url).ok_or_else(|| Error::InvalidInstallMetadata {
                    reason: format!("'{url}' is not a GitHub repository URL"),
                })?;
                let release_dir = staging.join(RELEASE_DIR);
                match self
                    .releases
                    .download_release(&repo, reference.as_deref(), *allow_pre_release, &release_dir)
                    .await
                {
                    Ok(release) => Ok(Materialized {
                        dir: release_dir,
                        source: InstallSource::GitHubRelease {
                            url: url.clone(),
                            reference: reference.clone(),
                            release_tag: Some(release.tag_name),
                            auto_update: *auto_update,
                            allow_pre_release: *allow_pre_release,
                        },
                    }),
                    Err(e) => {
                        tracing::warn!(repo = %repo, error = %e, "Failed to fetch GitHub release");
                        let question = format!(
                            "Could not download a release for {repo} ({e}). Install by cloning the repository instead?"
                        );
                        if !prompter.confirm(&question).await? {
                            return Err(e.into());
                        }
                        let dir = self.clone_into(url, reference.as_deref(), staging).await?;
                        Ok(Materialized {
                            dir,
                            source: InstallSource::Git {
                                url: url.clone(),
                                reference: reference.clone(),
                                auto_update: *auto_update,
                                allow_pre_release: *allow_pre_release,
                            },
                        })
                    }
                }
            }
        }
    }

    async fn clone_into(&self, url: &str, reference: Option<&str>, staging: &Path) -> Result<PathBuf> {
        let dest = staging.join(CLONE_DIR);
        tracing::debug!(url = %url, reference = ?reference, "Cloning extension repository");
        extman_git::clone_repo(url, &dest, reference).await?;
        Ok(dest)
    }
}
