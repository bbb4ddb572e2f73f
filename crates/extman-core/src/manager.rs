//! The extension lifecycle orchestrator.
//!
//! [`ExtensionManager`] owns the registry of loaded extensions and drives
//! install, update, uninstall, enable and disable. Mutating operations take
//! `&mut self`; callers serialize them. The registry itself is an
//! `Arc<Vec<_>>` that is replaced on every change, so snapshots handed out
//! by [`ExtensionManager::extensions`] are never mutated underneath a reader.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ManagerConfig, trust_folder};
use crate::consent::{consent_required, consent_summary};
use crate::enablement::{EnablementScope, EnablementStore};
use crate::error::{Error, Result};
use crate::extension::LoadedExtension;
use crate::host::{
    AutoDenyPrompter, ConsentPrompter, ExtensionHost, ExtensionRegistryListener,
    NoopRegistryListener,
};
use crate::install::{InstallMetadata, InstallSource, InstallType};
use crate::loader::{LoadContext, inspect_staged, load_extension_from_dir};
use crate::manifest::{ExtensionManifest, SettingDeclaration, validate_extension_name};
use crate::secrets::{FileSecretStore, SecretStore};
use crate::settings::{ResolvedSetting, SettingScope, SettingsResolver, find_declaration, scope_dir};
use crate::source::{InstallSourceResolver, Materialized, is_allowed_extension_source};
use crate::telemetry::{EventStatus, ExtensionEvent, ExtensionEventKind, TelemetryEmitter};
use crate::variables::VariableContext;

const STAGING_PREFIX: &str = "extman-staging-";

/// Result of updating one extension in [`ExtensionManager::update_all_extensions`].
#[derive(Debug)]
pub struct UpdateOutcome {
    pub name: String,
    pub result: Result<LoadedExtension>,
}

pub struct ExtensionManager {
    config: Arc<ManagerConfig>,
    settings: SettingsResolver,
    enablement: EnablementStore,
    resolver: InstallSourceResolver,
    prompter: Arc<dyn ConsentPrompter>,
    listener: Arc<dyn ExtensionRegistryListener>,
    host: Option<Arc<dyn ExtensionHost>>,
    telemetry: TelemetryEmitter,
    extensions: Arc<Vec<LoadedExtension>>,
    loaded: bool,
}

impl std::fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("config", &self.config)
            .field("extensions", &self.extensions.len())
            .field("loaded", &self.loaded)
            .field("host_bound", &self.host.is_some())
            .finish_non_exhaustive()
    }
}

impl ExtensionManager {
    /// Create a manager with non-interactive defaults: consent is declined,
    /// secrets go to the file store under the home directory and telemetry
    /// is off.
    pub fn new(config: ManagerConfig) -> Result<Self> {
        let enablement = EnablementStore::load(&config.enablement_path)?;
        let resolver = InstallSourceResolver::new(&config.workspace_dir, &config.github_api_url)?;
        let secrets: Arc<dyn SecretStore> = Arc::new(FileSecretStore::new(&config.secrets_path));
        Ok(Self {
            settings: SettingsResolver::new(secrets),
            enablement,
            resolver,
            prompter: Arc::new(AutoDenyPrompter),
            listener: Arc::new(NoopRegistryListener),
            host: None,
            telemetry: TelemetryEmitter::disabled(),
            extensions: Arc::new(Vec::new()),
            loaded: false,
            config: Arc::new(config),
        })
    }

    pub fn with_prompter(mut self, prompter: Arc<dyn ConsentPrompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ExtensionRegistryListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_secret_store(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.settings = SettingsResolver::new(secrets);
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryEmitter) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Snapshot of the registry.
    pub fn extensions(&self) -> Arc<Vec<LoadedExtension>> {
        Arc::clone(&self.extensions)
    }

    /// Look up a loaded extension by name, case-insensitively.
    pub fn get_extension(&self, name: &str) -> Option<&LoadedExtension> {
        self.extensions
            .iter()
            .find(|ext| ext.name.eq_ignore_ascii_case(name))
    }

    /// Attach the running session. From here on restarts go through the
    /// host, and toggling is suppressed if the host cannot reload.
    pub fn bind_host(&mut self, host: Arc<dyn ExtensionHost>) {
        self.host = Some(host);
    }

    fn load_context(&self) -> LoadContext {
        LoadContext {
            config: Arc::clone(&self.config),
            settings: self.settings.clone(),
            enablement: Arc::new(self.enablement.clone()),
        }
    }

    fn update_registry(&mut self, change: impl FnOnce(&mut Vec<LoadedExtension>)) {
        let mut next = (*self.extensions).clone();
        change(&mut next);
        self.extensions = Arc::new(next);
    }

    async fn start(&self, extension: &LoadedExtension) {
        if let Err(e) = self.listener.extension_started(extension).await {
            tracing::warn!(extension = %extension.name, error = %e, "Extension failed to start");
        }
    }

    async fn stop(&self, extension: &LoadedExtension) {
        if let Err(e) = self.listener.extension_stopped(extension).await {
            tracing::warn!(extension = %extension.name, error = %e, "Extension failed to stop");
        }
    }

    /// Load every installed extension. Allowed once per manager.
    ///
    /// Directories load concurrently; broken ones are logged and skipped.
    /// When two share a manifest name the first in directory order wins.
    /// Active extensions are then started one at a time in directory order.
    pub async fn load_extensions(&mut self) -> Result<Arc<Vec<LoadedExtension>>> {
        if self.loaded {
            return Err(Error::AlreadyLoaded);
        }
        self.loaded = true;

        let dirs = self.installed_dirs().await?;
        let ctx = self.load_context();
        let handles: Vec<_> = dirs
            .into_iter()
            .map(|dir| {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    let result = load_extension_from_dir(&ctx, &dir).await;
                    (dir, result)
                })
            })
            .collect();

        let mut loaded: Vec<LoadedExtension> = Vec::with_capacity(handles.len());
        for handle in handles {
            let (dir, result) = match handle.await {
                Ok(joined) => joined,
                Err(e) => {
                    tracing::warn!(error = %e, "Extension load task failed");
                    continue;
                }
            };
            match result {
                Ok(extension) => {
                    if loaded.iter().any(|e| e.name.eq_ignore_ascii_case(&extension.name)) {
                        tracing::debug!(
                            extension = %extension.name,
                            path = %dir.display(),
                            "Skipping extension with duplicate name"
                        );
                        continue;
                    }
                    loaded.push(extension);
                }
                Err(e) => {
                    tracing::debug!(path = %dir.display(), error = %e, "Skipping extension that failed to load");
                }
            }
        }

        for extension in loaded.iter().filter(|e| e.is_active) {
            self.start(extension).await;
        }

        tracing::info!(count = loaded.len(), "Loaded extensions");
        self.extensions = Arc::new(loaded);
        Ok(self.extensions())
    }

    /// Subdirectories of the extensions root, sorted by name.
    async fn installed_dirs(&self) -> Result<Vec<PathBuf>> {
        let root = &self.config.extensions_dir;
        let mut entries = match tokio::fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(extman_fs::Error::io(root, e).into()),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
                dirs.push(path);
            } else {
                tracing::debug!(path = %path.display(), "Ignoring non-directory in extensions root");
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Load one installed extension and add it to the registry.
    ///
    /// Failures and duplicate names are logged and yield `None`.
    pub async fn load_extension(&mut self, install_dir: &Path) -> Option<LoadedExtension> {
        match self.load_and_register(install_dir).await {
            Ok(extension) => Some(extension),
            Err(e) => {
                tracing::warn!(path = %install_dir.display(), error = %e, "Skipping extension that failed to load");
                None
            }
        }
    }

    async fn load_and_register(&mut self, install_dir: &Path) -> Result<LoadedExtension> {
        let extension = load_extension_from_dir(&self.load_context(), install_dir).await?;
        if let Some(existing) = self.get_extension(&extension.name) {
            return Err(Error::AlreadyInstalled {
                name: extension.name.clone(),
                path: existing.install_dir.clone(),
            });
        }
        if extension.is_active {
            self.start(&extension).await;
        }
        let registered = extension.clone();
        self.update_registry(|list| list.push(registered));
        Ok(extension)
    }

    /// Install a new extension, or update one when `previous_manifest` is
    /// given.
    ///
    /// The previous version is uninstalled before the new files are copied
    /// in. If the new copy then fails to load, the extension stays
    /// uninstalled.
    pub async fn install_or_update_extension(
        &mut self,
        metadata: InstallMetadata,
        previous_manifest: Option<ExtensionManifest>,
    ) -> Result<LoadedExtension> {
        let source = InstallSource::try_from(metadata)?;

        if source.is_remote() && !self.config.allow_remote_extensions {
            return Err(Error::RemoteInstallsDisallowed {
                location: source.location(),
            });
        }

        if !self.config.workspace_trusted {
            let workspace = self.config.workspace_dir.clone();
            if !self.prompter.request_workspace_trust(&workspace).await? {
                return Err(Error::WorkspaceNotTrusted { path: workspace });
            }
            trust_folder(&self.config.user_policy_path(), &workspace)?;
            Arc::make_mut(&mut self.config).workspace_trusted = true;
            tracing::info!(workspace = %workspace.display(), "Workspace marked as trusted");
        }

        let source = self.resolver.resolve(source)?;

        let location = source.location();
        if !is_allowed_extension_source(&location, &self.config.allowed_sources) {
            return Err(Error::SourceNotAllowed { location });
        }

        let staging = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?;
        let result = self
            .install_staged(&source, previous_manifest.as_ref(), staging.path())
            .await;
        if let Err(e) = staging.close() {
            tracing::warn!(error = %e, "Failed to remove staging directory");
        }
        result
    }

    async fn install_staged(
        &mut self,
        source: &InstallSource,
        previous: Option<&ExtensionManifest>,
        staging: &Path,
    ) -> Result<LoadedExtension> {
        let prompter = Arc::clone(&self.prompter);
        let materialized = self
            .resolver
            .materialize(source, staging, prompter.as_ref())
            .await?;

        match self.install_materialized(&materialized, previous).await {
            Ok(extension) => Ok(extension),
            Err(e) => {
                self.report_install_failure(&materialized, previous, &e).await;
                Err(e)
            }
        }
    }

    async fn install_materialized(
        &mut self,
        materialized: &Materialized,
        previous: Option<&ExtensionManifest>,
    ) -> Result<LoadedExtension> {
        let staged = inspect_staged(&materialized.dir, &self.config.workspace_dir).await?;
        let name = staged.manifest.name.clone();
        let install_dir = self.config.extension_dir(&name);
        let on_disk = tokio::fs::try_exists(&install_dir).await?;

        match previous {
            None => {
                if on_disk || self.get_extension(&name).is_some() {
                    return Err(Error::AlreadyInstalled {
                        name,
                        path: install_dir,
                    });
                }
            }
            Some(prev) => {
                let prev_dir = self.config.extension_dir(&prev.name);
                let prev_installed = self.get_extension(&prev.name).is_some()
                    || tokio::fs::try_exists(&prev_dir).await?;
                if !prev_installed {
                    return Err(Error::NotInstalled {
                        name: prev.name.clone(),
                    });
                }
                if !prev.name.eq_ignore_ascii_case(&name)
                    && (on_disk || self.get_extension(&name).is_some())
                {
                    return Err(Error::AlreadyInstalled {
                        name,
                        path: install_dir,
                    });
                }
            }
        }

        let existing = previous.and_then(|prev| self.get_extension(&prev.name).cloned());
        if consent_required(existing.as_ref(), staged.hooks.as_ref(), &staged.skills) {
            let summary = consent_summary(&staged.manifest, staged.hooks.as_ref(), &staged.skills);
            if !self.prompter.confirm(&summary).await? {
                return Err(Error::ConsentDeclined {
                    action: format!("installing extension '{name}'"),
                });
            }
        }

        let captured = match previous {
            Some(prev) => {
                let prev_dir = self.config.extension_dir(&prev.name);
                let captured = self
                    .settings
                    .capture(&prev.name, &prev.settings, &prev_dir)
                    .await?;
                self.uninstall_extension(&prev.name, true).await?;
                if !prev.name.eq_ignore_ascii_case(&name) {
                    self.forget_extension_state(&prev.name, &prev.settings)?;
                }
                Some(captured)
            }
            None => None,
        };

        tokio::fs::create_dir_all(&install_dir)
            .await
            .map_err(|e| extman_fs::Error::io(&install_dir, e))?;
        if materialized.source.install_type() != InstallType::Link {
            let (from, to) = (materialized.dir.clone(), install_dir.clone());
            tokio::task::spawn_blocking(move || extman_fs::io::copy_dir_all(&from, &to))
                .await
                .map_err(|e| Error::Task(e.to_string()))??;
        }
        let metadata = InstallMetadata::from(&materialized.source);
        metadata.save(&install_dir)?;

        let declarations = &staged.manifest.settings;
        match &captured {
            Some(captured) => {
                self.settings
                    .restore(&name, captured, declarations, &install_dir)
                    .await?;
            }
            None => self.prompt_for_settings(&name, declarations, &install_dir).await?,
        }
        let resolved = self
            .settings
            .resolve(
                &name,
                declarations,
                &install_dir,
                &self.config.workspace_settings_dir(&name),
            )
            .await?;
        for missing in resolved.missing() {
            tracing::warn!(
                extension = %name,
                setting = %missing.env_var,
                "Extension setting has no value"
            );
        }

        let extension = self.load_and_register(&install_dir).await?;
        let kind = match previous {
            Some(prev) => ExtensionEventKind::Update {
                previous_version: prev.version.clone(),
            },
            None => ExtensionEventKind::Install,
        };
        self.telemetry
            .emit(ExtensionEvent::for_extension(kind, EventStatus::Success, &extension));

        if previous.is_none() {
            self.enable_extension(&name, EnablementScope::User).await?;
        }

        tracing::info!(
            extension = %name,
            version = %extension.version,
            source_kind = %metadata.install_type,
            "Installed extension"
        );
        Ok(self.get_extension(&name).cloned().unwrap_or(extension))
    }

    async fn prompt_for_settings(
        &self,
        name: &str,
        declarations: &[SettingDeclaration],
        install_dir: &Path,
    ) -> Result<()> {
        if declarations.is_empty() {
            return Ok(());
        }
        let resolved = self
            .settings
            .resolve(
                name,
                declarations,
                install_dir,
                &self.config.workspace_settings_dir(name),
            )
            .await?;
        for missing in resolved.missing() {
            let Some(declaration) = declarations.iter().find(|d| d.env_var == missing.env_var) else {
                continue;
            };
            if let Some(value) = self.prompter.prompt_setting(declaration).await? {
                self.settings
                    .set(name, declaration, &value, SettingScope::User, install_dir)
                    .await?;
            }
        }
        Ok(())
    }

    async fn report_install_failure(
        &self,
        materialized: &Materialized,
        previous: Option<&ExtensionManifest>,
        error: &Error,
    ) {
        let vars = VariableContext::for_extension(&materialized.dir, &self.config.workspace_dir);
        let staged = ExtensionManifest::load(&materialized.dir, &vars).await.ok();
        let (name, version) = match (&staged, previous) {
            (Some(m), _) => (m.name.as_str(), Some(m.version.as_str())),
            (None, Some(prev)) => (prev.name.as_str(), Some(prev.version.as_str())),
            (None, None) => ("unknown", None),
        };
        let metadata = InstallMetadata::from(&materialized.source);
        let (kind, operation) = match previous {
            Some(prev) => (
                ExtensionEventKind::Update {
                    previous_version: prev.version.clone(),
                },
                "update",
            ),
            None => (ExtensionEventKind::Install, "install"),
        };

        tracing::error!(extension = %name, operation, error = %error, "Extension install failed");
        self.telemetry.emit(ExtensionEvent::new(
            kind,
            EventStatus::Failure,
            name,
            version,
            Some(&metadata),
        ));
        self.telemetry.emit(ExtensionEvent::new(
            ExtensionEventKind::Error {
                operation: operation.to_string(),
                message: error.to_string(),
            },
            EventStatus::Failure,
            name,
            version,
            Some(&metadata),
        ));
    }

    /// Remove an extension by name or install source (case-insensitive).
    ///
    /// With `is_update` set, enablement records and secrets are kept and no
    /// uninstall event is emitted.
    pub async fn uninstall_extension(&mut self, identifier: &str, is_update: bool) -> Result<()> {
        let extension = self
            .extensions
            .iter()
            .find(|ext| ext.matches(identifier))
            .cloned();

        let Some(extension) = extension else {
            let not_found = || Error::ExtensionNotFound {
                name: identifier.to_string(),
            };
            if validate_extension_name(identifier).is_err() {
                return Err(not_found());
            }
            let orphan = self.config.extension_dir(identifier);
            if orphan.parent() != Some(self.config.extensions_dir.as_path()) {
                return Err(not_found());
            }
            if tokio::fs::try_exists(&orphan).await? {
                tracing::info!(path = %orphan.display(), "Removing unloaded extension directory");
                extman_fs::io::remove_dir_all_if_exists(&orphan)?;
                if !is_update {
                    self.enablement.remove(identifier)?;
                }
                return Ok(());
            }
            return Err(not_found());
        };

        if extension.is_active {
            self.stop(&extension).await;
        }
        self.update_registry(|list| list.retain(|e| e.name != extension.name));
        extman_fs::io::remove_dir_all_if_exists(&extension.install_dir)?;

        if !is_update {
            self.forget_extension_state(&extension.name, &extension.settings)?;
            self.telemetry.emit(ExtensionEvent::for_extension(
                ExtensionEventKind::Uninstall,
                EventStatus::Success,
                &extension,
            ));
            tracing::info!(extension = %extension.name, "Uninstalled extension");
        }
        Ok(())
    }

    /// Drop enablement records and stored secrets kept under `name`.
    fn forget_extension_state(&mut self, name: &str, declarations: &[SettingDeclaration]) -> Result<()> {
        self.enablement.remove(name)?;
        self.settings
            .clear_secrets(name, declarations, &self.config.workspace_settings_dir(name))
    }

    pub async fn enable_extension(&mut self, name: &str, scope: EnablementScope) -> Result<()> {
        self.set_enabled(name, scope, true).await
    }

    pub async fn disable_extension(&mut self, name: &str, scope: EnablementScope) -> Result<()> {
        self.set_enabled(name, scope, false).await
    }

    async fn set_enabled(&mut self, name: &str, scope: EnablementScope, enabled: bool) -> Result<()> {
        if !scope.is_settable() {
            return Err(Error::InvalidScope {
                scope: scope.to_string(),
            });
        }
        let extension = self
            .get_extension(name)
            .cloned()
            .ok_or_else(|| Error::ExtensionNotFound {
                name: name.to_string(),
            })?;

        let home = self.config.home_dir.clone();
        let workspace = self.config.workspace_dir.clone();
        match scope {
            EnablementScope::User => self.enablement.set(&extension.name, &home, enabled)?,
            EnablementScope::Workspace => self.enablement.set(&extension.name, &workspace, enabled)?,
            _ => {}
        }
        let active = match scope {
            EnablementScope::Session => enabled,
            _ => self.enablement.is_enabled(&extension.name, &workspace, &home),
        };

        if self.config.reloading_disabled && self.host.is_some() {
            tracing::debug!(
                extension = %extension.name,
                "Host cannot reload extensions; change applies next session"
            );
        } else if extension.is_active != active {
            let mut toggled = extension.clone();
            toggled.is_active = active;
            if active {
                self.start(&toggled).await;
            } else {
                self.stop(&toggled).await;
            }
            self.update_registry(|list| {
                if let Some(entry) = list.iter_mut().find(|e| e.name == toggled.name) {
                    entry.is_active = active;
                }
            });
        }

        let kind = if enabled {
            ExtensionEventKind::Enable { scope }
        } else {
            ExtensionEventKind::Disable { scope }
        };
        self.telemetry
            .emit(ExtensionEvent::for_extension(kind, EventStatus::Success, &extension));
        tracing::info!(extension = %extension.name, %scope, enabled, "Updated extension enablement");
        Ok(())
    }

    /// Restart an extension.
    ///
    /// Before a host is bound this unloads the extension and loads it again
    /// from disk, appending it to the registry.
    pub async fn restart_extension(&mut self, name: &str) -> Result<()> {
        let extension = self
            .get_extension(name)
            .cloned()
            .ok_or_else(|| Error::ExtensionNotFound {
                name: name.to_string(),
            })?;

        if let Some(host) = &self.host {
            return host.restart_extension(&extension).await;
        }

        if extension.is_active {
            self.stop(&extension).await;
        }
        self.update_registry(|list| list.retain(|e| e.name != extension.name));
        self.load_and_register(&extension.install_dir).await?;
        Ok(())
    }

    /// Re-fetch an installed extension from its recorded source.
    pub async fn update_extension(&mut self, name: &str) -> Result<LoadedExtension> {
        let extension = self
            .get_extension(name)
            .cloned()
            .ok_or_else(|| Error::ExtensionNotFound {
                name: name.to_string(),
            })?;
        let metadata = extension
            .install_metadata
            .clone()
            .ok_or_else(|| Error::InvalidInstallMetadata {
                reason: format!("extension '{}' has no install metadata", extension.name),
            })?;

        tracing::info!(extension = %extension.name, from = %extension.version, "Updating extension");
        self.install_or_update_extension(metadata, Some(extension.manifest))
            .await
    }

    /// Update every git or release extension that opted into auto-update.
    pub async fn update_all_extensions(&mut self) -> Vec<UpdateOutcome> {
        let candidates: Vec<String> = self
            .extensions
            .iter()
            .filter(|ext| {
                ext.install_metadata.as_ref().is_some_and(|m| {
                    m.auto_update == Some(true)
                        && matches!(m.install_type, InstallType::Git | InstallType::GithubRelease)
                })
            })
            .map(|ext| ext.name.clone())
            .collect();

        let mut outcomes = Vec::with_capacity(candidates.len());
        for name in candidates {
            let result = self.update_extension(&name).await;
            if let Err(e) = &result {
                tracing::warn!(extension = %name, error = %e, "Auto-update failed");
            }
            outcomes.push(UpdateOutcome { name, result });
        }
        outcomes
    }

    /// Set a declared setting and reload the extension's resolved view.
    pub async fn update_setting(
        &mut self,
        name: &str,
        setting: &str,
        value: &str,
        scope: SettingScope,
    ) -> Result<()> {
        let extension = self
            .get_extension(name)
            .cloned()
            .ok_or_else(|| Error::ExtensionNotFound {
                name: name.to_string(),
            })?;
        let declaration = find_declaration(&extension.name, &extension.settings, setting)?;
        let dir = scope_dir(
            scope,
            &extension.install_dir,
            &self.config.workspace_settings_dir(&extension.name),
        );
        self.settings
            .set(&extension.name, declaration, value, scope, &dir)
            .await?;

        let mut reloaded = load_extension_from_dir(&self.load_context(), &extension.install_dir).await?;
        reloaded.is_active = extension.is_active;
        self.update_registry(|list| {
            if let Some(entry) = list.iter_mut().find(|e| e.name == reloaded.name) {
                *entry = reloaded;
            }
        });
        Ok(())
    }

    /// Declared settings of `name` that have no value in any scope.
    pub async fn missing_settings(&self, name: &str) -> Result<Vec<ResolvedSetting>> {
        let extension = self.get_extension(name).ok_or_else(|| Error::ExtensionNotFound {
            name: name.to_string(),
        })?;
        let resolved = self
            .settings
            .resolve(
                &extension.name,
                &extension.settings,
                &extension.install_dir,
                &self.config.workspace_settings_dir(&extension.name),
            )
            .await?;
        Ok(resolved.missing().into_iter().cloned().collect())
    }
}
