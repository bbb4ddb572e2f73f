//! Per-extension settings resolved from user and workspace scopes.
//!
//! Plain values live in dotenv files:
//! - user scope: `<extension dir>/.env`
//! - workspace scope: `<workspace>/.extman/extensions/<name>/.env`
//!
//! Sensitive values never touch those files. They are kept in a
//! [`SecretStore`] under the service `extman:<name>:user` or
//! `extman:<name>:workspace:<workspace settings dir>`, and surface as
//! [`SENSITIVE_PLACEHOLDER`] everywhere except hook/skill/agent hydration.
//! Keying workspace secrets by directory keeps two checkouts that install
//! the same extension from reading each other's values.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::SettingDeclaration;
use crate::secrets::SecretStore;

/// Shown in place of a sensitive value.
pub const SENSITIVE_PLACEHOLDER: &str = "***";
/// Source label for values held by the secret store.
pub const KEYCHAIN_SOURCE: &str = "Keychain";
pub const ENV_FILENAME: &str = ".env";

/// Scope a setting value is recorded at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingScope {
    User,
    Workspace,
}

impl fmt::Display for SettingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Workspace => write!(f, "workspace"),
        }
    }
}

/// A declared setting with its effective value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSetting {
    pub name: String,
    pub env_var: String,
    /// Masked when `sensitive` is set.
    pub value: Option<String>,
    pub sensitive: bool,
    /// `None` when no scope supplies a value.
    pub scope: Option<SettingScope>,
    /// File path, or [`KEYCHAIN_SOURCE`].
    pub source: Option<String>,
}

/// Resolved settings plus the unmasked environment for hydration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub settings: Vec<ResolvedSetting>,
    env: BTreeMap<String, String>,
}

impl ResolvedSettings {
    /// Real values keyed by env var, including sensitive ones.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Declared settings that have no value in any scope.
    pub fn missing(&self) -> Vec<&ResolvedSetting> {
        self.settings.iter().filter(|s| s.value.is_none()).collect()
    }
}

/// Setting values held over an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedSettings {
    env: BTreeMap<String, String>,
    secrets: BTreeMap<String, String>,
}

/// Reads and writes extension settings.
#[derive(Clone)]
pub struct SettingsResolver {
    secrets: Arc<dyn SecretStore>,
}

impl fmt::Debug for SettingsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsResolver").finish_non_exhaustive()
    }
}

impl SettingsResolver {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// `workspace_dir` only takes part in the workspace-scope service.
    fn service(extension: &str, scope: SettingScope, workspace_dir: &Path) -> String {
        match scope {
            SettingScope::User => format!("extman:{extension}:{scope}"),
            SettingScope::Workspace => {
                format!("extman:{extension}:{scope}:{}", workspace_dir.display())
            }
        }
    }

    /// Resolve every declaration, workspace scope first.
    pub async fn resolve(
        &self,
        extension: &str,
        declarations: &[SettingDeclaration],
        user_dir: &Path,
        workspace_dir: &Path,
    ) -> Result<ResolvedSettings> {
        let user_path = user_dir.join(ENV_FILENAME);
        let workspace_path = workspace_dir.join(ENV_FILENAME);
        let user_env = read_env_file(&user_path).await?;
        let workspace_env = read_env_file(&workspace_path).await?;

        let mut resolved = ResolvedSettings::default();
        for declaration in declarations {
            let found = if declaration.sensitive {
                let mut found = None;
                for scope in [SettingScope::Workspace, SettingScope::User] {
                    let service = Self::service(extension, scope, workspace_dir);
                    if let Some(value) = self.secrets.get(&service, &declaration.env_var)? {
                        found = Some((value, scope, KEYCHAIN_SOURCE.to_string()));
                        break;
                    }
                }
                found
            } else if let Some(value) = workspace_env.get(&declaration.env_var) {
                Some((
                    value.clone(),
                    SettingScope::Workspace,
                    workspace_path.display().to_string(),
                ))
            } else {
                user_env.get(&declaration.env_var).map(|value| {
                    (
                        value.clone(),
                        SettingScope::User,
                        user_path.display().to_string(),
                    )
                })
            };

            let (value, scope, source) = match found {
                Some((value, scope, source)) => {
                    resolved.env.insert(declaration.env_var.clone(), value.clone());
                    let shown = if declaration.sensitive {
                        SENSITIVE_PLACEHOLDER.to_string()
                    } else {
                        value
                    };
                    (Some(shown), Some(scope), Some(source))
                }
                None => (None, None, None),
            };

            resolved.settings.push(ResolvedSetting {
                name: declaration.name.clone(),
                env_var: declaration.env_var.clone(),
                value,
                sensitive: declaration.sensitive,
                scope,
                source,
            });
        }
        Ok(resolved)
    }

    /// Store `value` for `declaration` at `scope`.
    ///
    /// `dir` is the directory holding that scope's `.env` file.
    pub async fn set(
        &self,
        extension: &str,
        declaration: &SettingDeclaration,
        value: &str,
        scope: SettingScope,
        dir: &Path,
    ) -> Result<()> {
        let path = dir.join(ENV_FILENAME);
        let mut env = read_env_file(&path).await?;

        if declaration.sensitive {
            self.secrets
                .set(&Self::service(extension, scope, dir), &declaration.env_var, value)?;
            if env.remove(&declaration.env_var).is_some() {
                write_env_file(&path, &env)?;
            }
        } else {
            env.insert(declaration.env_var.clone(), value.to_string());
            write_env_file(&path, &env)?;
        }

        tracing::debug!(
            extension = %extension,
            setting = %declaration.env_var,
            scope = %scope,
            "Updated extension setting"
        );
        Ok(())
    }

    /// Snapshot user-scope values before an update removes the directory.
    pub async fn capture(
        &self,
        extension: &str,
        declarations: &[SettingDeclaration],
        user_dir: &Path,
    ) -> Result<CapturedSettings> {
        let env = read_env_file(&user_dir.join(ENV_FILENAME)).await?;
        let service = Self::service(extension, SettingScope::User, user_dir);
        let mut secrets = BTreeMap::new();
        for declaration in declarations.iter().filter(|d| d.sensitive) {
            if let Some(value) = self.secrets.get(&service, &declaration.env_var)? {
                secrets.insert(declaration.env_var.clone(), value);
            }
        }
        Ok(CapturedSettings { env, secrets })
    }

    /// Write captured values back for settings the new version still declares.
    ///
    /// Secrets of settings that were dropped are deleted.
    pub async fn restore(
        &self,
        extension: &str,
        captured: &CapturedSettings,
        declarations: &[SettingDeclaration],
        user_dir: &Path,
    ) -> Result<()> {
        let declared = |env_var: &str| declarations.iter().find(|d| d.env_var == env_var);

        let path = user_dir.join(ENV_FILENAME);
        let mut env = read_env_file(&path).await?;
        let mut changed = false;
        for (key, value) in &captured.env {
            if declared(key).is_some_and(|d| !d.sensitive) {
                env.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        if changed {
            write_env_file(&path, &env)?;
        }

        let service = Self::service(extension, SettingScope::User, user_dir);
        for (key, value) in &captured.secrets {
            if declared(key).is_some_and(|d| d.sensitive) {
                self.secrets.set(&service, key, value)?;
            } else {
                self.secrets.delete(&service, key)?;
            }
        }
        Ok(())
    }

    /// Remove stored secrets for the user scope and the workspace rooted at
    /// `workspace_dir`. `.env` files go with their directories.
    pub fn clear_secrets(
        &self,
        extension: &str,
        declarations: &[SettingDeclaration],
        workspace_dir: &Path,
    ) -> Result<()> {
        for scope in [SettingScope::User, SettingScope::Workspace] {
            let service = Self::service(extension, scope, workspace_dir);
            for declaration in declarations.iter().filter(|d| d.sensitive) {
                self.secrets.delete(&service, &declaration.env_var)?;
            }
        }
        Ok(())
    }
}

/// Parse a dotenv file. A missing file is empty; bad lines are skipped.
pub async fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(extman_fs::Error::io(path, e).into()),
    };

    let mut env = BTreeMap::new();
    for item in dotenvy::from_read_iter(content.as_slice()) {
        match item {
            Ok((key, value)) => {
                env.insert(key, value);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping malformed .env entry");
            }
        }
    }
    Ok(env)
}

fn write_env_file(path: &Path, env: &BTreeMap<String, String>) -> Result<()> {
    let mut content = String::new();
    for (key, value) in env {
        content.push_str(key);
        content.push_str("=\"");
        content.push_str(&escape_env_value(value));
        content.push_str("\"\n");
    }
    extman_fs::io::write_text(path, &content)?;
    Ok(())
}

fn escape_env_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Directory holding the `.env` for `scope`.
pub fn scope_dir(scope: SettingScope, user_dir: &Path, workspace_dir: &Path) -> PathBuf {
    match scope {
        SettingScope::User => user_dir.to_path_buf(),
        SettingScope::Workspace => workspace_dir.to_path_buf(),
    }
}

/// Look up a declaration by env var or display name.
pub fn find_declaration<'a>(
    extension: &str,
    declarations: &'a [SettingDeclaration],
    setting: &str,
) -> Result<&'a SettingDeclaration> {
    declarations
        .iter()
        .find(|d| d.env_var == setting || d.name.eq_ignore_ascii_case(setting))
        .ok_or_else(|| Error::UnknownSetting {
            extension: extension.to_string(),
            setting: setting.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn declaration(env_var: &str, sensitive: bool) -> SettingDeclaration {
        SettingDeclaration {
            name: env_var.to_lowercase(),
            description: String::new(),
            env_var: env_var.to_string(),
            sensitive,
        }
    }

    struct Fixture {
        user: TempDir,
        workspace: TempDir,
        resolver: SettingsResolver,
    }

    fn fixture() -> Fixture {
        Fixture {
            user: TempDir::new().unwrap(),
            workspace: TempDir::new().unwrap(),
            resolver: SettingsResolver::new(Arc::new(MemorySecretStore::new())),
        }
    }

    #[tokio::test]
    async fn workspace_scope_wins_over_user_scope() {
        let f = fixture();
        let decls = [declaration("REGION", false)];
        std::fs::write(f.user.path().join(".env"), "REGION=us-east-1\n").unwrap();
        std::fs::write(f.workspace.path().join(".env"), "REGION=eu-west-1\n").unwrap();

        let resolved = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();

        let setting = &resolved.settings[0];
        assert_eq!(setting.value.as_deref(), Some("eu-west-1"));
        assert_eq!(setting.scope, Some(SettingScope::Workspace));
        assert_eq!(resolved.env()["REGION"], "eu-west-1");
    }

    #[tokio::test]
    async fn empty_value_counts_as_present() {
        let f = fixture();
        let decls = [declaration("FLAG", false)];
        std::fs::write(f.workspace.path().join(".env"), "FLAG=\n").unwrap();
        std::fs::write(f.user.path().join(".env"), "FLAG=fallback\n").unwrap();

        let resolved = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();

        assert_eq!(resolved.settings[0].value.as_deref(), Some(""));
        assert_eq!(resolved.settings[0].scope, Some(SettingScope::Workspace));
        assert!(resolved.missing().is_empty());
    }

    #[tokio::test]
    async fn sensitive_values_are_masked_but_real_in_env() {
        let f = fixture();
        let decls = [declaration("API_KEY", true)];
        f.resolver
            .set("ext", &decls[0], "hunter2", SettingScope::User, f.user.path())
            .await
            .unwrap();

        let resolved = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();

        let setting = &resolved.settings[0];
        assert_eq!(setting.value.as_deref(), Some(SENSITIVE_PLACEHOLDER));
        assert_eq!(setting.source.as_deref(), Some(KEYCHAIN_SOURCE));
        assert_eq!(resolved.env()["API_KEY"], "hunter2");
        assert!(!f.user.path().join(".env").exists());
    }

    #[tokio::test]
    async fn unset_settings_are_reported_missing() {
        let f = fixture();
        let decls = [declaration("A", false), declaration("B", true)];

        let resolved = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();

        assert_eq!(resolved.missing().len(), 2);
        assert_eq!(resolved.settings[0].scope, None);
        assert!(resolved.env().is_empty());
    }

    #[tokio::test]
    async fn set_round_trips_awkward_values() {
        let f = fixture();
        let decl = declaration("TEMPLATE", false);
        let value = "say \"hi\" to $USER\\n\nnext line";
        f.resolver
            .set("ext", &decl, value, SettingScope::User, f.user.path())
            .await
            .unwrap();

        let env = read_env_file(&f.user.path().join(".env")).await.unwrap();
        assert_eq!(env["TEMPLATE"], value);
    }

    #[tokio::test]
    async fn capture_and_restore_keep_still_declared_values() {
        let f = fixture();
        let old = [
            declaration("KEEP", false),
            declaration("DROP", false),
            declaration("TOKEN", true),
        ];
        for decl in &old {
            f.resolver
                .set("ext", decl, "v", SettingScope::User, f.user.path())
                .await
                .unwrap();
        }

        let captured = f.resolver.capture("ext", &old, f.user.path()).await.unwrap();
        std::fs::remove_file(f.user.path().join(".env")).unwrap();

        let new = [declaration("KEEP", false)];
        f.resolver
            .restore("ext", &captured, &new, f.user.path())
            .await
            .unwrap();

        let env = read_env_file(&f.user.path().join(".env")).await.unwrap();
        assert_eq!(env.keys().collect::<Vec<_>>(), vec!["KEEP"]);

        let resolved = f
            .resolver
            .resolve("ext", &[declaration("TOKEN", true)], f.user.path(), f.workspace.path())
            .await
            .unwrap();
        assert_eq!(resolved.settings[0].value, None);
    }

    #[tokio::test]
    async fn workspace_secrets_are_isolated_per_workspace() {
        let f = fixture();
        let other = TempDir::new().unwrap();
        let decls = [declaration("API_KEY", true)];
        f.resolver
            .set("ext", &decls[0], "alpha", SettingScope::Workspace, f.workspace.path())
            .await
            .unwrap();

        let here = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();
        assert_eq!(here.env()["API_KEY"], "alpha");
        assert_eq!(here.settings[0].scope, Some(SettingScope::Workspace));

        let there = f
            .resolver
            .resolve("ext", &decls, f.user.path(), other.path())
            .await
            .unwrap();
        assert_eq!(there.settings[0].value, None);

        f.resolver.clear_secrets("ext", &decls, other.path()).unwrap();
        let here = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();
        assert_eq!(here.env()["API_KEY"], "alpha");

        f.resolver
            .clear_secrets("ext", &decls, f.workspace.path())
            .unwrap();
        let here = f
            .resolver
            .resolve("ext", &decls, f.user.path(), f.workspace.path())
            .await
            .unwrap();
        assert!(here.env().is_empty());
    }

    #[test]
    fn find_declaration_by_env_var_or_name() {
        let decls = [declaration("API_KEY", true)];
        assert!(find_declaration("ext", &decls, "API_KEY").is_ok());
        assert!(find_declaration("ext", &decls, "api_key").is_ok());
        assert!(matches!(
            find_declaration("ext", &decls, "NOPE"),
            Err(Error::UnknownSetting { .. })
        ));
    }
}
