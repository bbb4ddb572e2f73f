//! Collaborator interfaces the manager calls out to.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::extension::LoadedExtension;
use crate::manifest::SettingDeclaration;

/// Asks the user to approve security-relevant actions.
#[async_trait]
pub trait ConsentPrompter: Send + Sync {
    /// Show `message` and return whether the user agreed.
    async fn confirm(&self, message: &str) -> Result<bool>;

    /// Ask whether `workspace` should be trusted.
    async fn request_workspace_trust(&self, workspace: &Path) -> Result<bool>;

    /// Ask for a setting value. `None` leaves the setting unset.
    async fn prompt_setting(&self, setting: &SettingDeclaration) -> Result<Option<String>>;
}

/// Theme and command registry notified as extensions start and stop.
#[async_trait]
pub trait ExtensionRegistryListener: Send + Sync {
    async fn extension_started(&self, extension: &LoadedExtension) -> Result<()>;
    async fn extension_stopped(&self, extension: &LoadedExtension) -> Result<()>;
}

/// A running session that can restart an extension in place.
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    async fn restart_extension(&self, extension: &LoadedExtension) -> Result<()>;
}

/// Declines every request. Used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDenyPrompter;

#[async_trait]
impl ConsentPrompter for AutoDenyPrompter {
    async fn confirm(&self, message: &str) -> Result<bool> {
        tracing::debug!(message = %message, "Declining consent request (non-interactive)");
        Ok(false)
    }

    async fn request_workspace_trust(&self, workspace: &Path) -> Result<bool> {
        tracing::debug!(workspace = %workspace.display(), "Declining workspace trust (non-interactive)");
        Ok(false)
    }

    async fn prompt_setting(&self, _setting: &SettingDeclaration) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Approves every request without asking. Settings are left unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprovePrompter;

#[async_trait]
impl ConsentPrompter for AutoApprovePrompter {
    async fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(true)
    }

    async fn request_workspace_trust(&self, _workspace: &Path) -> Result<bool> {
        Ok(true)
    }

    async fn prompt_setting(&self, _setting: &SettingDeclaration) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRegistryListener;

#[async_trait]
impl ExtensionRegistryListener for NoopRegistryListener {
    async fn extension_started(&self, _extension: &LoadedExtension) -> Result<()> {
        Ok(())
    }

    async fn extension_stopped(&self, _extension: &LoadedExtension) -> Result<()> {
        Ok(())
    }
}
