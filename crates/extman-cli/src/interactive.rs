//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation and input. Prompts block,
//! so each one runs on the blocking thread pool.

use std::path::Path;

use async_trait::async_trait;
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};
use extman_core::{ConsentPrompter, Error, Result, SettingDeclaration};

/// Terminal-backed [`ConsentPrompter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

async fn blocking<T, F>(prompt: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::result::Result<T, dialoguer::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| Error::Task(e.to_string()))?
        .map_err(|e| Error::Io(std::io::Error::other(e)))
}

#[async_trait]
impl ConsentPrompter for DialoguerPrompter {
    async fn confirm(&self, message: &str) -> Result<bool> {
        println!();
        println!("{message}");
        blocking(|| {
            Confirm::new()
                .with_prompt("Do you want to continue?")
                .default(false)
                .interact()
        })
        .await
    }

    async fn request_workspace_trust(&self, workspace: &Path) -> Result<bool> {
        let prompt = format!(
            "Do you trust the files in {}? Extensions can only be installed into trusted workspaces",
            workspace.display().to_string().cyan()
        );
        blocking(move || Confirm::new().with_prompt(prompt).default(false).interact()).await
    }

    async fn prompt_setting(&self, setting: &SettingDeclaration) -> Result<Option<String>> {
        println!("{} {}", setting.name.bold(), setting.description.dimmed());
        let prompt = format!("Value for {}", setting.env_var);
        let value = if setting.sensitive {
            blocking(move || {
                Password::new()
                    .with_prompt(prompt)
                    .allow_empty_password(true)
                    .interact()
            })
            .await?
        } else {
            blocking(move || {
                Input::<String>::new()
                    .with_prompt(prompt)
                    .allow_empty(true)
                    .interact_text()
            })
            .await?
        };
        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}
