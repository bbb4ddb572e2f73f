//! State written by one manager must be what the next one loads.

mod support;

use std::sync::Arc;

use extman_core::config::{CONFIG_DIR_NAME, POLICY_FILENAME};
use extman_core::{EnablementScope, Error, ErrorKind, InstallMetadata, InstallType, SettingScope};
use extman_test_utils::TestExtension;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{Sandbox, ScriptedPrompter};

fn local(ext: &TestExtension) -> InstallMetadata {
    InstallMetadata::new(InstallType::Local, ext.path().display().to_string())
}

#[tokio::test]
async fn test_enablement_and_settings_survive_restart() {
    let sandbox = Sandbox::new();
    let source = TestExtension::with_manifest(json!({
        "name": "notes",
        "version": "1.0.0",
        "settings": [{ "name": "Folder", "description": "Notes folder", "envVar": "NOTES_DIR" }]
    }));

    {
        let (mut manager, _events) =
            sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
        manager.install_or_update_extension(local(&source), None).await.unwrap();
        manager
            .disable_extension("notes", EnablementScope::Workspace)
            .await
            .unwrap();
        manager
            .update_setting("notes", "NOTES_DIR", "/srv/notes", SettingScope::Workspace)
            .await
            .unwrap();
    }

    let (manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::default())).await;
    let notes = manager.get_extension("notes").unwrap();

    assert!(!notes.is_active);
    let setting = &notes.resolved_settings()[0];
    assert_eq!(setting.value.as_deref(), Some("/srv/notes"));
    assert_eq!(setting.scope, Some(SettingScope::Workspace));
}

#[tokio::test]
async fn test_trust_granted_once_is_remembered() {
    let sandbox = Sandbox::new();
    assert!(!sandbox.config().workspace_trusted);

    let source = TestExtension::new("trusted", "1.0.0");
    let (mut manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
    manager.install_or_update_extension(local(&source), None).await.unwrap();

    assert!(sandbox.config().workspace_trusted);

    // A prompter that would refuse trust is never asked again
    let other = TestExtension::new("second", "1.0.0");
    let (mut manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::default())).await;
    manager.install_or_update_extension(local(&other), None).await.unwrap();
    assert_eq!(manager.extensions().len(), 2);
}

#[tokio::test]
async fn test_broken_install_directory_is_skipped_on_load() {
    let sandbox = Sandbox::new();
    let good = TestExtension::new("good", "1.0.0");
    {
        let (mut manager, _events) =
            sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
        manager.install_or_update_extension(local(&good), None).await.unwrap();
    }

    let broken = sandbox.config().extension_dir("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("gemini-extension.json"), "{ not json").unwrap();

    let (manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::default())).await;
    let names: Vec<String> = manager.extensions().iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["good"]);
}

#[tokio::test]
async fn test_policy_file_allow_list_blocks_install() {
    let sandbox = Sandbox::new();
    let policy = sandbox.home.path().join(CONFIG_DIR_NAME).join(POLICY_FILENAME);
    std::fs::create_dir_all(policy.parent().unwrap()).unwrap();
    std::fs::write(
        &policy,
        "allowed-sources = [\"^https://github\\\\.com/acme/.*\"]\n",
    )
    .unwrap();

    let source = TestExtension::new("blocked", "1.0.0");
    let (mut manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
    let err = manager
        .install_or_update_extension(local(&source), None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SourceNotAllowed { .. }));
    assert_eq!(err.kind(), ErrorKind::PolicyViolation);
    assert!(!manager.config().extension_dir("blocked").exists());
}
