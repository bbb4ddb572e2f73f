//! GitHub release lookup, asset selection and archive extraction

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use flate2::read::GzDecoder;
use serde::Deserialize;
use tar::Archive;

use crate::error::{Error, Result};
use crate::github::GitHubRepo;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const RELEASE_USER_AGENT: &str = "extman/release-download";
const RELEASE_TIMEOUT: Duration = Duration::from_secs(60);

/// A release as returned by the GitHub REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
    #[serde(default)]
    pub tarball_url: Option<String>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Outcome of a successful release download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedRelease {
    pub tag_name: String,
    /// Asset that was unpacked, or `None` when the source tarball was used.
    pub asset_name: Option<String>,
}

/// Thin client over the GitHub releases API.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    api_url: String,
}

impl ReleaseClient {
    /// Create a client against `api_url` (normally [`DEFAULT_GITHUB_API_URL`]).
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(RELEASE_TIMEOUT)
            .user_agent(RELEASE_USER_AGENT)
            .build()
            .map_err(|e| Error::Http {
                url: api_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, api_url })
    }

    /// Look up the release to install.
    ///
    /// A pinned `tag` wins; otherwise pre-releases are considered only when
    /// `allow_pre_release` is set, falling back to `/releases/latest`.
    pub async fn fetch_release(
        &self,
        repo: &GitHubRepo,
        tag: Option<&str>,
        allow_pre_release: bool,
    ) -> Result<GitHubRelease> {
        let base = format!("{}/repos/{}/{}/releases", self.api_url, repo.owner, repo.repo);

        if let Some(tag) = tag {
            return self.get_json(&format!("{base}/tags/{tag}"), repo).await;
        }

        if allow_pre_release {
            let releases: Vec<GitHubRelease> = self.get_json(&base, repo).await?;
            return releases
                .into_iter()
                .find(|release| !release.draft)
                .ok_or_else(|| Error::ReleaseNotFound {
                    repo: repo.to_string(),
                });
        }

        self.get_json(&format!("{base}/latest"), repo).await
    }

    /// Fetch a release and unpack its best matching archive into `dest`.
    pub async fn download_release(
        &self,
        repo: &GitHubRepo,
        tag: Option<&str>,
        allow_pre_release: bool,
        dest: &Path,
    ) -> Result<DownloadedRelease> {
        let release = self.fetch_release(repo, tag, allow_pre_release).await?;

        let (url, asset_name) = match select_asset(&release.assets, host_os(), host_arch()) {
            Some(asset) => (asset.browser_download_url.clone(), Some(asset.name.clone())),
            None => match release.tarball_url.clone() {
                Some(url) => (url, None),
                None => {
                    return Err(Error::ReleaseNotFound {
                        repo: repo.to_string(),
                    });
                }
            },
        };

        tracing::debug!(repo = %repo, tag = %release.tag_name, url = %url, "Downloading release archive");
        let bytes = self.get_bytes(&url).await?;

        let dest_path = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_tar_gz(&bytes, &dest_path))
            .await
            .map_err(|e| Error::Task(e.to_string()))??;

        Ok(DownloadedRelease {
            tag_name: release.tag_name,
            asset_name,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        repo: &GitHubRepo,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| http_error(url, e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ReleaseNotFound {
                repo: repo.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        response.json::<T>().await.map_err(|e| http_error(url, e))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|e| http_error(url, e))?;

        if !response.status().is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| http_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn http_error(url: &str, error: reqwest::Error) -> Error {
    Error::Http {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Platform name as used in release asset file names.
pub fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Architecture name as used in release asset file names.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        other => other,
    }
}

fn is_tarball(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".tar.gz") || lower.ends_with(".tgz")
}

const PLATFORM_PREFIXES: [&str; 3] = ["darwin.", "linux.", "win32."];

/// Pick the asset to install for the given platform.
///
/// Preference: `<os>.<arch>.` prefix, then `<os>.` prefix, then a gzip
/// tarball with no platform prefix. Assets built for another platform are
/// never chosen. Only gzip tarballs are considered.
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], os: &str, arch: &str) -> Option<&'a ReleaseAsset> {
    let tarballs: Vec<&ReleaseAsset> = assets.iter().filter(|a| is_tarball(&a.name)).collect();
    let platform_arch = format!("{os}.{arch}.");
    let platform = format!("{os}.");

    tarballs
        .iter()
        .find(|a| a.name.to_ascii_lowercase().starts_with(&platform_arch))
        .or_else(|| {
            tarballs
                .iter()
                .find(|a| a.name.to_ascii_lowercase().starts_with(&platform))
        })
        .or_else(|| tarballs.iter().find(|a| !is_platform_specific(&a.name)))
        .copied()
}

/// Asset names prefixed for some platform, whichever it is.
fn is_platform_specific(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    PLATFORM_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Unpack a gzip tarball into `dest`, flattening a single top-level directory.
pub fn extract_tar_gz(data: &[u8], dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| extman_fs::Error::io(dest, e))?;

    let mut archive = Archive::new(GzDecoder::new(data));
    archive.unpack(dest).map_err(|e| Error::Extract {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;

    flatten_single_directory(dest)
}

fn flatten_single_directory(dest: &Path) -> Result<()> {
    let entries: Vec<PathBuf> = fs::read_dir(dest)
        .map_err(|e| extman_fs::Error::io(dest, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();

    let [only] = entries.as_slice() else {
        return Ok(());
    };
    if !only.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(only).map_err(|e| extman_fs::Error::io(only, e))? {
        let entry = entry.map_err(|e| extman_fs::Error::io(only, e))?;
        let target = dest.join(entry.file_name());
        fs::rename(entry.path(), &target).map_err(|e| extman_fs::Error::io(&target, e))?;
    }
    fs::remove_dir(only).map_err(|e| extman_fs::Error::io(only, e))?;
    Ok(())
}
