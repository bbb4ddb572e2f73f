//! Install, update and uninstall an extension cloned from a real git
//! repository, with hooks, skills, agents and settings flowing through
//! every layer.

mod support;

use std::path::MAIN_SEPARATOR;
use std::sync::Arc;

use extman_core::hooks::HookEventName;
use extman_core::manifest::MANIFEST_FILENAME;
use extman_core::settings::{ENV_FILENAME, SENSITIVE_PLACEHOLDER};
use extman_core::{ExtensionEventKind, InstallMetadata, InstallType};
use extman_test_utils::{TestExtension, git};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use support::{Sandbox, ScriptedPrompter, drain};

fn weather_manifest(version: &str) -> Value {
    json!({
        "name": "weather",
        "version": version,
        "settings": [
            { "name": "City", "description": "Default city", "envVar": "WEATHER_CITY" },
            { "name": "Api Key", "description": "Service key", "envVar": "WEATHER_KEY", "sensitive": true }
        ],
        "mcpServers": {
            "forecast": { "command": "node", "args": ["${extensionPath}${/}server.js"] }
        }
    })
}

fn weather_source() -> TestExtension {
    TestExtension::with_manifest(weather_manifest("1.0.0"))
        .with_context_file("# Weather")
        .with_hooks(json!({
            "hooks": { "BeforeTool": [{ "hooks": [
                { "type": "command", "command": "fetch ${WEATHER_CITY} ${WEATHER_KEY}" }
            ]}]}
        }))
        .with_skill("forecast", "Explain a forecast", "Default to ${WEATHER_CITY}.")
        .with_agent("meteorologist", "Weather expert", "You live in ${WEATHER_CITY}.")
}

fn weather_prompter() -> Arc<ScriptedPrompter> {
    Arc::new(
        ScriptedPrompter::trusting()
            .with_value("WEATHER_CITY", "Oslo")
            .with_value("WEATHER_KEY", "s3cret"),
    )
}

#[tokio::test]
async fn test_git_extension_full_lifecycle() {
    let sandbox = Sandbox::new();
    let source = weather_source();
    git::commit_all(source.path(), "v1");

    let prompter = weather_prompter();
    let (mut manager, mut events) = sandbox.manager(Arc::clone(&prompter)).await;

    // Install
    let metadata = InstallMetadata::new(InstallType::Git, git::file_url(source.path()))
        .with_auto_update(true);
    let installed = manager.install_or_update_extension(metadata, None).await.unwrap();

    let install_dir = manager.config().extension_dir("weather");
    assert_eq!(installed.version, "1.0.0");
    assert!(installed.is_active);
    assert_eq!(installed.path, install_dir);
    assert!(install_dir.join(MANIFEST_FILENAME).exists());
    assert_eq!(prompter.confirmations(), 1);

    let hooks = installed.hooks.as_ref().unwrap();
    assert_eq!(hooks[&HookEventName::BeforeTool][0].hooks[0].command, "fetch Oslo s3cret");
    assert!(installed.skills[0].body.contains("Default to Oslo."));
    assert!(installed.agents[0].prompt.contains("You live in Oslo."));
    assert_eq!(
        installed.mcp_servers["forecast"]["args"][0],
        format!("{}{MAIN_SEPARATOR}server.js", install_dir.display())
    );

    let key = installed
        .resolved_settings()
        .iter()
        .find(|s| s.env_var == "WEATHER_KEY")
        .unwrap();
    assert_eq!(key.value.as_deref(), Some(SENSITIVE_PLACEHOLDER));
    let env_file = std::fs::read_to_string(install_dir.join(ENV_FILENAME)).unwrap();
    assert!(env_file.contains("WEATHER_CITY"));
    assert!(!env_file.contains("s3cret"));

    let kinds: Vec<_> = drain(&mut events).into_iter().map(|e| e.kind).collect();
    assert!(matches!(kinds[0], ExtensionEventKind::Install));

    // Update to a new commit; settings carry over, no new consent needed
    source.write_manifest(&weather_manifest("2.0.0"));
    git::commit_all(source.path(), "v2");

    let updated = manager.update_extension("weather").await.unwrap();
    assert_eq!(updated.version, "2.0.0");
    assert_eq!(prompter.confirmations(), 1);
    let hooks = updated.hooks.as_ref().unwrap();
    assert_eq!(hooks[&HookEventName::BeforeTool][0].hooks[0].command, "fetch Oslo s3cret");
    assert_eq!(manager.extensions().len(), 1);

    let events = drain(&mut events);
    assert_eq!(
        events[0].kind,
        ExtensionEventKind::Update {
            previous_version: "1.0.0".to_string()
        }
    );

    // Uninstall removes files, enablement and secrets
    manager.uninstall_extension("weather", false).await.unwrap();
    assert!(manager.extensions().is_empty());
    assert!(!install_dir.exists());

    let config = manager.config();
    let enablement: Value =
        serde_json::from_str(&std::fs::read_to_string(&config.enablement_path).unwrap()).unwrap();
    assert!(enablement.get("weather").is_none());
    if let Ok(secrets) = std::fs::read_to_string(&config.secrets_path) {
        assert!(!secrets.contains("s3cret"));
    }
    assert!(source.path().join(MANIFEST_FILENAME).exists());
}

#[tokio::test]
async fn test_pinned_ref_installs_tagged_commit() {
    let sandbox = Sandbox::new();
    let source = TestExtension::new("pinned", "1.0.0");
    let repo = git::commit_all(source.path(), "v1");
    git::tag_head(&repo, "v1.0.0");
    source.write_manifest(&json!({ "name": "pinned", "version": "1.1.0" }));
    git::commit_all(source.path(), "v1.1");

    let (mut manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
    let metadata =
        InstallMetadata::new(InstallType::Git, git::file_url(source.path())).with_ref("v1.0.0");
    let installed = manager.install_or_update_extension(metadata, None).await.unwrap();

    assert_eq!(installed.version, "1.0.0");
    let sidecar = InstallMetadata::load(&installed.install_dir).unwrap().unwrap();
    assert_eq!(sidecar.reference.as_deref(), Some("v1.0.0"));
    assert_eq!(sidecar.install_type, InstallType::Git);
}

#[tokio::test]
async fn test_update_all_only_touches_auto_update_git_extensions() {
    let sandbox = Sandbox::new();
    let remote = TestExtension::new("alpha", "1.0.0");
    git::commit_all(remote.path(), "v1");
    let local = TestExtension::new("beta", "1.0.0");

    let (mut manager, _events) = sandbox.manager(Arc::new(ScriptedPrompter::trusting())).await;
    manager
        .install_or_update_extension(
            InstallMetadata::new(InstallType::Git, git::file_url(remote.path()))
                .with_auto_update(true),
            None,
        )
        .await
        .unwrap();
    manager
        .install_or_update_extension(
            InstallMetadata::new(InstallType::Local, local.path().display().to_string()),
            None,
        )
        .await
        .unwrap();

    remote.write_manifest(&json!({ "name": "alpha", "version": "1.1.0" }));
    git::commit_all(remote.path(), "v1.1");
    local.write_manifest(&json!({ "name": "beta", "version": "9.9.9" }));

    let outcomes = manager.update_all_extensions().await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].name, "alpha");
    assert_eq!(outcomes[0].result.as_ref().unwrap().version, "1.1.0");
    assert_eq!(manager.get_extension("beta").unwrap().version, "1.0.0");
}
