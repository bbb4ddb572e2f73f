//! GitHub repository URL parsing

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://(?:www\.)?github\.com/|git@github\.com:)([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?(?:[/?#].*)?$",
    )
    .expect("static regex is valid")
});

/// An `owner/repo` pair parsed from a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl GitHubRepo {
    /// Parse a GitHub HTTPS or SSH URL.
    ///
    /// Returns `None` for any other host or an unrecognised shape.
    pub fn parse(url: &str) -> Option<Self> {
        let captures = GITHUB_URL.captures(url.trim())?;
        Some(Self {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
        })
    }

    /// The canonical `https://github.com/<owner>/<repo>` form.
    pub fn canonical_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
