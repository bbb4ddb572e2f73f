//! Settings command implementations.

use colored::Colorize;
use extman_core::SettingScope;

use super::CommandContext;
use crate::error::{CliError, Result};

/// Handle `extman settings set <name> <setting> <value> [--scope]`
pub async fn run_settings_set(
    ctx: &CommandContext,
    name: &str,
    setting: &str,
    value: &str,
    scope: SettingScope,
) -> Result<()> {
    let mut manager = ctx.open_manager().await?;
    manager.update_setting(name, setting, value, scope).await?;
    println!(
        "{} Updated '{}' for extension '{}' ({} scope)",
        "=>".green().bold(),
        setting,
        name.cyan(),
        scope
    );
    Ok(())
}

/// Handle `extman settings list <name>`
pub async fn run_settings_list(ctx: &CommandContext, name: &str) -> Result<()> {
    let manager = ctx.open_manager().await?;
    let extension = manager
        .get_extension(name)
        .ok_or_else(|| CliError::user(format!("Extension '{name}' is not installed")))?;

    let settings = extension.resolved_settings();
    if settings.is_empty() {
        println!(
            "{} Extension '{}' declares no settings",
            "=>".blue().bold(),
            extension.name.cyan()
        );
        return Ok(());
    }

    println!("{} Settings for '{}':", "=>".blue().bold(), extension.name.cyan());
    for setting in settings {
        let value = match &setting.value {
            Some(value) => value.normal(),
            None => "(not set)".yellow(),
        };
        let origin = match (&setting.scope, &setting.source) {
            (Some(scope), Some(source)) => format!("{scope}: {source}"),
            (Some(scope), None) => scope.to_string(),
            _ => String::new(),
        };
        let marker = if setting.sensitive { " (sensitive)" } else { "" };
        println!(
            "   {} = {} {}",
            setting.env_var.bold(),
            value,
            origin.dimmed()
        );
        println!("     {}{}", setting.name.dimmed(), marker.dimmed());
    }
    Ok(())
}
