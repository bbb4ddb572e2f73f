//! Extension command implementations.
//!
//! Each handler opens an [`ExtensionManager`](extman_core::ExtensionManager)
//! for the current home and workspace, runs one lifecycle operation and
//! reports the outcome. Failures propagate to `main`, which prints them and
//! exits non-zero.

use std::path::Path;

use colored::Colorize;
use extman_core::consent::consent_summary;
use extman_core::loader::inspect_staged;
use extman_core::{EnablementScope, InstallMetadata, InstallType, LoadedExtension};

use super::CommandContext;
use crate::error::{CliError, Result};

/// Handle `extman install <source> [--ref R] [--auto-update] [--pre-release]`
pub async fn run_install(
    ctx: &CommandContext,
    source: &str,
    reference: Option<String>,
    auto_update: bool,
    pre_release: bool,
) -> Result<()> {
    let mut metadata = InstallMetadata::from_source(source);
    if let Some(reference) = reference {
        metadata = metadata.with_ref(reference);
    }
    if auto_update {
        metadata = metadata.with_auto_update(true);
    }
    if pre_release {
        metadata = metadata.with_pre_release(true);
    }

    let mut manager = ctx.open_manager().await?;
    let extension = manager.install_or_update_extension(metadata, None).await?;

    println!(
        "{} Extension '{}' v{} installed and enabled",
        "=>".green().bold(),
        extension.name.cyan(),
        extension.version
    );
    report_missing_settings(&extension);
    Ok(())
}

/// Handle `extman link <path>`
pub async fn run_link(ctx: &CommandContext, path: &Path) -> Result<()> {
    let metadata = InstallMetadata::new(InstallType::Link, path.display().to_string());

    let mut manager = ctx.open_manager().await?;
    let extension = manager.install_or_update_extension(metadata, None).await?;

    println!(
        "{} Extension '{}' v{} linked from {}",
        "=>".green().bold(),
        extension.name.cyan(),
        extension.version,
        extension.path.display()
    );
    report_missing_settings(&extension);
    Ok(())
}

/// Handle `extman uninstall <name|source>`
pub async fn run_uninstall(ctx: &CommandContext, identifier: &str) -> Result<()> {
    let mut manager = ctx.open_manager().await?;
    let name = manager
        .extensions()
        .iter()
        .find(|ext| ext.matches(identifier))
        .map(|ext| ext.name.clone())
        .unwrap_or_else(|| identifier.to_string());

    manager.uninstall_extension(identifier, false).await?;

    println!("{} Extension '{}' uninstalled", "=>".green().bold(), name.cyan());
    Ok(())
}

/// Handle `extman update <name>` and `extman update --all`
pub async fn run_update(ctx: &CommandContext, name: Option<&str>, all: bool) -> Result<()> {
    let mut manager = ctx.open_manager().await?;

    if !all {
        let name = name.ok_or_else(|| CliError::user("Specify an extension name or --all"))?;
        let previous = manager
            .get_extension(name)
            .map(|ext| ext.version.clone())
            .unwrap_or_default();
        let updated = manager.update_extension(name).await?;
        print_updated(&updated, &previous);
        return Ok(());
    }

    let outcomes = manager.update_all_extensions().await;
    if outcomes.is_empty() {
        println!("{} No extensions have auto-update enabled", "=>".blue().bold());
        return Ok(());
    }

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(updated) => println!(
                "   {} {} v{}",
                "updated".green(),
                updated.name.cyan(),
                updated.version
            ),
            Err(e) => {
                failed += 1;
                println!("   {} {}: {}", "failed".red(), outcome.name.cyan(), e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} of {} extension update(s) failed",
            outcomes.len()
        )));
    }
    Ok(())
}

fn print_updated(extension: &LoadedExtension, previous: &str) {
    if previous == extension.version {
        println!(
            "{} Extension '{}' reinstalled at v{}",
            "=>".green().bold(),
            extension.name.cyan(),
            extension.version
        );
    } else {
        println!(
            "{} Extension '{}' updated from v{} to v{}",
            "=>".green().bold(),
            extension.name.cyan(),
            previous,
            extension.version
        );
    }
}

/// Handle `extman enable <name> [--scope]`
pub async fn run_enable(ctx: &CommandContext, name: &str, scope: EnablementScope) -> Result<()> {
    let mut manager = ctx.open_manager().await?;
    manager.enable_extension(name, scope).await?;
    println!(
        "{} Extension '{}' enabled for {} scope",
        "=>".green().bold(),
        name.cyan(),
        scope
    );
    Ok(())
}

/// Handle `extman disable <name> [--scope]`
pub async fn run_disable(ctx: &CommandContext, name: &str, scope: EnablementScope) -> Result<()> {
    let mut manager = ctx.open_manager().await?;
    manager.disable_extension(name, scope).await?;
    println!(
        "{} Extension '{}' disabled for {} scope",
        "=>".green().bold(),
        name.cyan(),
        scope
    );
    Ok(())
}

/// Handle `extman list [--json]`
pub async fn run_list(ctx: &CommandContext, json: bool) -> Result<()> {
    let manager = ctx.open_manager().await?;
    let extensions = manager.extensions();

    if json {
        println!("{}", serde_json::to_string_pretty(extensions.as_slice())?);
        return Ok(());
    }

    if extensions.is_empty() {
        println!("{} No extensions installed", "=>".blue().bold());
        return Ok(());
    }

    for ext in extensions.iter() {
        let status = if ext.is_active {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        println!("{} ({}) [{}]", ext.name.cyan().bold(), ext.version, status);
        println!("   {} {}", "Path:".dimmed(), ext.path.display());
        if let Some(metadata) = &ext.install_metadata {
            println!(
                "   {} {} ({})",
                "Source:".dimmed(),
                metadata.source,
                metadata.install_type
            );
            if let Some(tag) = &metadata.release_tag {
                println!("   {} {}", "Release:".dimmed(), tag);
            }
        }
        if !ext.mcp_servers.is_empty() {
            let names: Vec<&str> = ext.mcp_servers.keys().map(String::as_str).collect();
            println!("   {} {}", "MCP servers:".dimmed(), names.join(", "));
        }
        if !ext.context_files.is_empty() {
            let files: Vec<String> = ext
                .context_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            println!("   {} {}", "Context files:".dimmed(), files.join(", "));
        }
        if !ext.skills.is_empty() {
            let names: Vec<&str> = ext.skills.iter().map(|s| s.name.as_str()).collect();
            println!("   {} {}", "Skills:".dimmed(), names.join(", "));
        }
        if !ext.agents.is_empty() {
            let names: Vec<&str> = ext.agents.iter().map(|a| a.name.as_str()).collect();
            println!("   {} {}", "Agents:".dimmed(), names.join(", "));
        }
        if let Some(hooks) = &ext.hooks {
            let events: Vec<String> = hooks.keys().map(ToString::to_string).collect();
            println!("   {} {}", "Hooks:".dimmed(), events.join(", "));
        }
        report_missing_settings(ext);
    }
    Ok(())
}

/// Handle `extman validate <path>`
pub async fn run_validate(ctx: &CommandContext, path: &Path) -> Result<()> {
    let dir = ctx.workspace.join(path);
    if !dir.is_dir() {
        return Err(CliError::user(format!(
            "'{}' is not a directory",
            path.display()
        )));
    }

    let staged = inspect_staged(&dir, &ctx.workspace).await?;
    println!(
        "{} Extension '{}' v{} is valid",
        "=>".green().bold(),
        staged.manifest.name.cyan(),
        staged.manifest.version
    );
    println!();
    print!(
        "{}",
        consent_summary(&staged.manifest, staged.hooks.as_ref(), &staged.skills)
    );
    Ok(())
}

fn report_missing_settings(extension: &LoadedExtension) {
    let missing: Vec<&str> = extension
        .resolved_settings()
        .iter()
        .filter(|s| s.value.is_none())
        .map(|s| s.env_var.as_str())
        .collect();
    if !missing.is_empty() {
        println!(
            "   {} {} (run {})",
            "Missing settings:".yellow(),
            missing.join(", "),
            format!("extman settings set {} <ENV_VAR> <value>", extension.name).bold()
        );
    }
}
