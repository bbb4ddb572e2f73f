//! Shared fixtures for extman-core integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use extman_core::{
    ConsentPrompter, ExtensionEvent, ExtensionHost, ExtensionManager, ExtensionRegistryListener,
    LoadedExtension, ManagerConfig, MemorySecretStore, Result, SettingDeclaration,
    TelemetryEmitter,
};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Prompter with scripted answers that records every question.
#[derive(Default)]
pub struct RecordingPrompter {
    pub approve: bool,
    pub trust: bool,
    pub setting_values: HashMap<String, String>,
    pub confirmations: Mutex<Vec<String>>,
    pub trust_requests: Mutex<Vec<String>>,
    pub setting_prompts: Mutex<Vec<String>>,
}

impl RecordingPrompter {
    pub fn approving() -> Self {
        Self {
            approve: true,
            trust: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.confirmations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConsentPrompter for RecordingPrompter {
    async fn confirm(&self, message: &str) -> Result<bool> {
        self.confirmations.lock().unwrap().push(message.to_string());
        Ok(self.approve)
    }

    async fn request_workspace_trust(&self, workspace: &Path) -> Result<bool> {
        self.trust_requests
            .lock()
            .unwrap()
            .push(workspace.display().to_string());
        Ok(self.trust)
    }

    async fn prompt_setting(&self, setting: &SettingDeclaration) -> Result<Option<String>> {
        self.setting_prompts
            .lock()
            .unwrap()
            .push(setting.env_var.clone());
        Ok(self.setting_values.get(&setting.env_var).cloned())
    }
}

/// Records `start:<name>` / `stop:<name>` in call order.
#[derive(Default)]
pub struct RecordingListener {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtensionRegistryListener for RecordingListener {
    async fn extension_started(&self, extension: &LoadedExtension) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("start:{}", extension.name));
        Ok(())
    }

    async fn extension_stopped(&self, extension: &LoadedExtension) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("stop:{}", extension.name));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub restarts: Mutex<Vec<String>>,
}

#[async_trait]
impl ExtensionHost for RecordingHost {
    async fn restart_extension(&self, extension: &LoadedExtension) -> Result<()> {
        self.restarts.lock().unwrap().push(extension.name.clone());
        Ok(())
    }
}

/// Isolated home and workspace plus recording collaborators.
pub struct Harness {
    pub home: TempDir,
    pub workspace: TempDir,
    pub prompter: Arc<RecordingPrompter>,
    pub listener: Arc<RecordingListener>,
    pub secrets: Arc<MemorySecretStore>,
    pub events: UnboundedReceiver<ExtensionEvent>,
    telemetry: TelemetryEmitter,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_prompter(RecordingPrompter::approving())
    }

    pub fn with_prompter(prompter: RecordingPrompter) -> Self {
        let (telemetry, events) = TelemetryEmitter::channel();
        Self {
            home: TempDir::new().unwrap(),
            workspace: TempDir::new().unwrap(),
            prompter: Arc::new(prompter),
            listener: Arc::new(RecordingListener::default()),
            secrets: Arc::new(MemorySecretStore::new()),
            events,
            telemetry,
        }
    }

    /// Default configuration with the workspace already trusted.
    pub fn config(&self) -> ManagerConfig {
        let mut config = ManagerConfig::new(self.home.path(), self.workspace.path());
        config.workspace_trusted = true;
        config
    }

    pub fn manager(&self) -> ExtensionManager {
        self.manager_with(self.config())
    }

    pub fn manager_with(&self, config: ManagerConfig) -> ExtensionManager {
        ExtensionManager::new(config)
            .unwrap()
            .with_prompter(self.prompter.clone())
            .with_listener(self.listener.clone())
            .with_secret_store(self.secrets.clone())
            .with_telemetry(self.telemetry.clone())
    }

    /// A manager that has already run `load_extensions`.
    pub async fn loaded_manager(&self) -> ExtensionManager {
        let mut manager = self.manager();
        manager.load_extensions().await.unwrap();
        manager
    }

    /// Drain queued telemetry events.
    pub fn drain_events(&mut self) -> Vec<ExtensionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub fn extensions_dir(&self) -> std::path::PathBuf {
        self.config().extensions_dir
    }
}
