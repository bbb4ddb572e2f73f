//! Fixtures shared by the cross-crate scenarios.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use extman_core::{
    ConsentPrompter, ExtensionEvent, ExtensionManager, ManagerConfig, Result, SettingDeclaration,
    TelemetryEmitter,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Approves everything and answers setting prompts from a fixed table.
#[derive(Default)]
pub struct ScriptedPrompter {
    pub trust: bool,
    pub values: HashMap<String, String>,
    pub confirmations: Mutex<usize>,
}

impl ScriptedPrompter {
    pub fn trusting() -> Self {
        Self {
            trust: true,
            ..Self::default()
        }
    }

    pub fn with_value(mut self, env_var: &str, value: &str) -> Self {
        self.values.insert(env_var.to_string(), value.to_string());
        self
    }

    pub fn confirmations(&self) -> usize {
        *self.confirmations.lock().unwrap()
    }
}

#[async_trait]
impl ConsentPrompter for ScriptedPrompter {
    async fn confirm(&self, _message: &str) -> Result<bool> {
        *self.confirmations.lock().unwrap() += 1;
        Ok(true)
    }

    async fn request_workspace_trust(&self, _workspace: &Path) -> Result<bool> {
        Ok(self.trust)
    }

    async fn prompt_setting(&self, setting: &SettingDeclaration) -> Result<Option<String>> {
        Ok(self.values.get(&setting.env_var).cloned())
    }
}

/// A home directory and a workspace, both temporary.
pub struct Sandbox {
    pub home: TempDir,
    pub workspace: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            workspace: TempDir::new().unwrap(),
        }
    }

    /// Configuration as the CLI would load it, from the policy files.
    pub fn config(&self) -> ManagerConfig {
        ManagerConfig::load(self.home.path(), self.workspace.path()).unwrap()
    }

    /// A loaded manager using the on-disk secret store and a telemetry
    /// channel the test can drain.
    pub async fn manager(
        &self,
        prompter: Arc<ScriptedPrompter>,
    ) -> (ExtensionManager, UnboundedReceiver<ExtensionEvent>) {
        let (telemetry, events) = TelemetryEmitter::channel();
        let mut manager = ExtensionManager::new(self.config())
            .unwrap()
            .with_prompter(prompter)
            .with_telemetry(telemetry);
        manager.load_extensions().await.unwrap();
        (manager, events)
    }
}

pub fn drain(events: &mut UnboundedReceiver<ExtensionEvent>) -> Vec<ExtensionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
