//! Command implementations for extman-cli

pub mod extension;
pub mod settings;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use extman_core::{
    AutoApprovePrompter, AutoDenyPrompter, ConsentPrompter, ExtensionManager, ManagerConfig,
    TelemetryEmitter,
};

use crate::error::{CliError, Result};
use crate::interactive::DialoguerPrompter;
use crate::telemetry::TracingTelemetrySink;

pub use extension::{
    run_disable, run_enable, run_install, run_link, run_list, run_uninstall, run_update,
    run_validate,
};
pub use settings::{run_settings_list, run_settings_set};

/// Directories and prompting mode shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub home: PathBuf,
    pub workspace: PathBuf,
    /// Approve every prompt without asking.
    pub consent: bool,
}

impl CommandContext {
    /// Resolve `--home` and `--workspace`, falling back to the user's home
    /// directory and the current directory.
    pub fn resolve(home: Option<PathBuf>, workspace: Option<PathBuf>, consent: bool) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => dirs::home_dir()
                .ok_or_else(|| CliError::user("Could not determine the home directory; pass --home"))?,
        };
        let workspace = match workspace {
            Some(workspace) => workspace,
            None => std::env::current_dir()?,
        };
        Ok(Self {
            home,
            workspace,
            consent,
        })
    }

    fn prompter(&self) -> Arc<dyn ConsentPrompter> {
        if self.consent {
            Arc::new(AutoApprovePrompter)
        } else if std::io::stdin().is_terminal() {
            Arc::new(DialoguerPrompter)
        } else {
            Arc::new(AutoDenyPrompter)
        }
    }

    /// Build a manager for this context and load the installed extensions.
    pub async fn open_manager(&self) -> Result<ExtensionManager> {
        let config = ManagerConfig::load(&self.home, &self.workspace)?;
        let mut manager = ExtensionManager::new(config)?
            .with_prompter(self.prompter())
            .with_telemetry(TelemetryEmitter::spawn(Arc::new(TracingTelemetrySink)));
        manager.load_extensions().await?;
        Ok(manager)
    }
}
