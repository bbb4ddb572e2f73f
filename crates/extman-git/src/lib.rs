//! Git and GitHub release transport for the extension manager
//!
//! Materializes remote extension sources into a local directory, either by
//! cloning with git2 or by downloading and unpacking a GitHub release.

pub mod clone;
pub mod error;
pub mod github;
pub mod release;

pub use clone::{clone_repo, clone_repo_blocking};
pub use error::{Error, Result};
pub use github::GitHubRepo;
pub use release::{DownloadedRelease, GitHubRelease, ReleaseAsset, ReleaseClient};
