//! The in-memory form of an activated extension.

use std::collections::BTreeMap;
use std::path::PathBuf;

use extman_git::GitHubRepo;
use serde::Serialize;
use serde_json::Value;

use crate::agents::Agent;
use crate::hooks::ExtensionHooks;
use crate::install::InstallMetadata;
use crate::manifest::{ExtensionManifest, SettingDeclaration};
use crate::settings::{ResolvedSetting, ResolvedSettings};
use crate::skills::Skill;

/// An installed extension loaded from disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedExtension {
    pub name: String,
    pub version: String,
    /// Stable anonymous identifier, see [`extension_id`].
    pub id: String,
    /// Directory the extension's files are read from. For links this is
    /// the link target.
    pub path: PathBuf,
    /// Permanent directory under the extensions root.
    pub install_dir: PathBuf,
    pub install_metadata: Option<InstallMetadata>,
    #[serde(skip)]
    pub manifest: ExtensionManifest,
    /// Context files that exist on disk.
    pub context_files: Vec<PathBuf>,
    /// MCP server configs with `trust` removed.
    pub mcp_servers: BTreeMap<String, Value>,
    pub exclude_tools: Vec<String>,
    pub themes: Vec<Value>,
    #[serde(skip)]
    pub hooks: Option<ExtensionHooks>,
    pub skills: Vec<Skill>,
    pub agents: Vec<Agent>,
    pub settings: Vec<SettingDeclaration>,
    #[serde(serialize_with = "serialize_resolved")]
    pub resolved_settings: ResolvedSettings,
    pub is_active: bool,
}

fn serialize_resolved<S: serde::Serializer>(
    resolved: &ResolvedSettings,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(resolved.settings.iter())
}

impl LoadedExtension {
    /// Masked settings for display.
    pub fn resolved_settings(&self) -> &[ResolvedSetting] {
        &self.resolved_settings.settings
    }

    /// Whether `identifier` names this extension, by name or install source.
    /// Case-insensitive.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(identifier)
            || self
                .install_metadata
                .as_ref()
                .is_some_and(|m| m.source.eq_ignore_ascii_case(identifier))
    }

    pub fn has_hooks(&self) -> bool {
        self.hooks.as_ref().is_some_and(|h| !h.is_empty())
    }
}

/// Identifier used in telemetry and listings.
///
/// SHA-256 hex of the canonical GitHub URL when the source is on GitHub,
/// else of the install source, else of the name. Raw sources never leave
/// the process.
pub fn extension_id(name: &str, install_metadata: Option<&InstallMetadata>) -> String {
    let basis = match install_metadata {
        Some(metadata) => match GitHubRepo::parse(&metadata.source) {
            Some(repo) => repo.canonical_url(),
            None => metadata.source.clone(),
        },
        None => name.to_string(),
    };
    extman_fs::sha256_hex(&basis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::InstallType;

    #[test]
    fn github_sources_share_an_id() {
        let https = InstallMetadata::new(InstallType::Git, "https://github.com/acme/ext.git");
        let ssh = InstallMetadata::new(InstallType::Git, "git@github.com:acme/ext.git");

        let id = extension_id("ext", Some(&https));
        assert_eq!(id, extension_id("ext", Some(&ssh)));
        assert_eq!(id, extman_fs::sha256_hex("https://github.com/acme/ext"));
    }

    #[test]
    fn falls_back_to_source_then_name() {
        let local = InstallMetadata::new(InstallType::Local, "/src/ext");
        assert_eq!(extension_id("ext", Some(&local)), extman_fs::sha256_hex("/src/ext"));
        assert_eq!(extension_id("ext", None), extman_fs::sha256_hex("ext"));
    }

    #[test]
    fn id_never_contains_the_source() {
        let local = InstallMetadata::new(InstallType::Local, "/home/user/secret-project");
        let id = extension_id("ext", Some(&local));
        assert_eq!(id.len(), 64);
        assert!(!id.contains("secret"));
    }
}
