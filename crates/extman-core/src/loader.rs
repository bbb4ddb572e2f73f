//! Builds a [`LoadedExtension`] from a directory on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::agents::load_agents;
use crate::config::ManagerConfig;
use crate::enablement::EnablementStore;
use crate::error::Result;
use crate::extension::{LoadedExtension, extension_id};
use crate::hooks::{ExtensionHooks, load_hooks, parse_hooks};
use crate::install::{InstallMetadata, InstallType};
use crate::manifest::{ExtensionManifest, MANIFEST_FILENAME};
use crate::settings::SettingsResolver;
use crate::skills::{Skill, load_skills};
use crate::variables::VariableContext;

/// Everything needed to load an extension, cheap to clone into tasks.
#[derive(Debug, Clone)]
pub struct LoadContext {
    pub config: Arc<ManagerConfig>,
    pub settings: SettingsResolver,
    pub enablement: Arc<EnablementStore>,
}

/// Load the installed extension in `install_dir`.
///
/// Link installs are read from their link target; settings always come from
/// the permanent directory.
pub async fn load_extension_from_dir(ctx: &LoadContext, install_dir: &Path) -> Result<LoadedExtension> {
    let install_metadata = InstallMetadata::load(install_dir)?;
    let path = match &install_metadata {
        Some(m) if m.install_type == InstallType::Link => PathBuf::from(&m.source),
        _ => install_dir.to_path_buf(),
    };

    let config = &ctx.config;
    let vars = VariableContext::for_extension(&path, &config.workspace_dir);
    let manifest = ExtensionManifest::load(&path, &vars).await?;

    let resolved_settings = ctx
        .settings
        .resolve(
            &manifest.name,
            &manifest.settings,
            install_dir,
            &config.workspace_settings_dir(&manifest.name),
        )
        .await?;
    let env_vars = vars.with_env(resolved_settings.env());

    let hooks = load_extension_hooks(&path, &manifest, &env_vars, resolved_settings.env()).await?;
    let skills = load_skills(&path, &env_vars).await;
    let agents = load_agents(&path, &env_vars).await;

    let mut context_files = Vec::new();
    for file in manifest.context_file_paths(&path) {
        if tokio::fs::metadata(&file).await.is_ok_and(|m| m.is_file()) {
            context_files.push(file);
        }
    }

    let is_active = ctx
        .enablement
        .is_enabled(&manifest.name, &config.workspace_dir, &config.home_dir);

    tracing::debug!(
        extension = %manifest.name,
        version = %manifest.version,
        path = %path.display(),
        active = is_active,
        "Loaded extension"
    );

    Ok(LoadedExtension {
        name: manifest.name.clone(),
        version: manifest.version.clone(),
        id: extension_id(&manifest.name, install_metadata.as_ref()),
        path,
        install_dir: install_dir.to_path_buf(),
        install_metadata,
        context_files,
        mcp_servers: manifest.exposed_mcp_servers(),
        exclude_tools: manifest.exclude_tools.clone(),
        themes: manifest.themes.clone(),
        hooks,
        skills,
        agents,
        settings: manifest.settings.clone(),
        resolved_settings,
        is_active,
        manifest,
    })
}

/// `hooks/hooks.json`, falling back to an inline `hooks` object in the manifest.
async fn load_extension_hooks(
    path: &Path,
    manifest: &ExtensionManifest,
    vars: &VariableContext,
    env: &BTreeMap<String, String>,
) -> Result<Option<ExtensionHooks>> {
    if let Some(hooks) = load_hooks(path, vars, env).await? {
        return Ok(Some(hooks));
    }
    match &manifest.hooks {
        Some(inline) if inline.is_object() => {
            let mut inline = inline.clone();
            vars.hydrate_value(&mut inline);
            parse_hooks(inline, &path.join(MANIFEST_FILENAME), env).map(Some)
        }
        _ => Ok(None),
    }
}

/// A freshly materialized extension, before it is installed.
#[derive(Debug, Clone)]
pub struct StagedExtension {
    pub manifest: ExtensionManifest,
    pub hooks: Option<ExtensionHooks>,
    pub skills: Vec<Skill>,
}

/// Validate the extension in `dir` and collect what consent needs to show.
pub async fn inspect_staged(dir: &Path, workspace_dir: &Path) -> Result<StagedExtension> {
    let vars = VariableContext::for_extension(dir, workspace_dir);
    let manifest = ExtensionManifest::load(dir, &vars).await?;
    let hooks = load_extension_hooks(dir, &manifest, &vars, &BTreeMap::new()).await?;
    let skills = load_skills(dir, &vars).await;
    Ok(StagedExtension {
        manifest,
        hooks,
        skills,
    })
}
