//! Consent text shown before an extension is installed or updated.

use std::collections::BTreeSet;
use std::fmt::Write;

use serde_json::Value;

use crate::extension::LoadedExtension;
use crate::hooks::{ExtensionHooks, hook_commands};
use crate::manifest::ExtensionManifest;
use crate::skills::Skill;

const THIRD_PARTY_WARNING: &str = "Extensions may be written by third parties and can run \
commands on your machine. Only install extensions from sources you trust.";

/// Describe what installing this extension would enable.
pub fn consent_summary(
    manifest: &ExtensionManifest,
    hooks: Option<&ExtensionHooks>,
    skills: &[Skill],
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Installing extension \"{}\" ({}).", manifest.name, manifest.version);

    if !manifest.mcp_servers.is_empty() {
        let _ = writeln!(out, "This extension will run the following MCP servers:");
        for (name, config) in &manifest.mcp_servers {
            let _ = writeln!(out, "  * {name}: {}", describe_server(config));
        }
    }

    if !manifest.context_file_names.is_empty() {
        let _ = writeln!(
            out,
            "This extension will append info to your context using {}",
            manifest.context_file_names.join(", ")
        );
    }

    if !manifest.exclude_tools.is_empty() {
        let _ = writeln!(
            out,
            "This extension will exclude the following core tools: {}",
            manifest.exclude_tools.join(", ")
        );
    }

    if let Some(hooks) = hooks.filter(|h| !h.is_empty()) {
        let _ = writeln!(
            out,
            "WARNING: This extension defines hooks that run commands automatically:"
        );
        for (event, command) in hook_commands(hooks) {
            let _ = writeln!(out, "  * [{event}] {command}");
        }
    }

    if !skills.is_empty() {
        let _ = writeln!(out, "This extension provides the following skills:");
        for skill in skills {
            let _ = writeln!(out, "  * {}: {}", skill.name, skill.description);
        }
    }

    out.push_str(THIRD_PARTY_WARNING);
    out
}

fn describe_server(config: &Value) -> String {
    if let Some(url) = config
        .get("httpUrl")
        .or_else(|| config.get("url"))
        .and_then(Value::as_str)
    {
        return format!("{url} (remote)");
    }
    let command = config.get("command").and_then(Value::as_str).unwrap_or("<unknown>");
    let args: Vec<&str> = config
        .get("args")
        .and_then(Value::as_array)
        .map(|args| args.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if args.is_empty() {
        format!("{command} (local)")
    } else {
        format!("{command} {} (local)", args.join(" "))
    }
}

/// Whether the user must be asked before proceeding.
///
/// Fresh installs always ask. Updates ask only when they add hook commands
/// or add or change skills.
pub fn consent_required(
    previous: Option<&LoadedExtension>,
    hooks: Option<&ExtensionHooks>,
    skills: &[Skill],
) -> bool {
    let Some(previous) = previous else {
        return true;
    };

    let old_commands: BTreeSet<String> = previous
        .hooks
        .as_ref()
        .map(|h| hook_commands(h).into_iter().map(|(e, c)| format!("{e}:{c}")).collect())
        .unwrap_or_default();
    let new_hooks = hooks.is_some_and(|h| {
        hook_commands(h)
            .into_iter()
            .any(|(e, c)| !old_commands.contains(&format!("{e}:{c}")))
    });

    let changed_skills = skills.iter().any(|skill| {
        !previous.skills.iter().any(|old| {
            old.name == skill.name && old.description == skill.description && old.body == skill.body
        })
    });

    new_hooks || changed_skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookCommand, HookDefinition, HookEventName};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    fn manifest() -> ExtensionManifest {
        ExtensionManifest::from_value(
            json!({
                "name": "foo",
                "version": "1.0.0",
                "excludeTools": ["run_shell_command"],
                "mcpServers": {
                    "local": { "command": "node", "args": ["server.js"] },
                    "remote": { "httpUrl": "https://mcp.example.com" }
                }
            }),
            Path::new("m.json"),
        )
        .unwrap()
    }

    fn hooks(command: &str) -> ExtensionHooks {
        let mut hooks = ExtensionHooks::new();
        hooks.insert(
            HookEventName::BeforeTool,
            vec![HookDefinition {
                matcher: None,
                sequential: false,
                hooks: vec![HookCommand {
                    command: command.to_string(),
                    env: BTreeMap::new(),
                    timeout: None,
                }],
            }],
        );
        hooks
    }

    fn skill(name: &str, body: &str) -> Skill {
        Skill {
            name: name.to_string(),
            description: "d".to_string(),
            body: body.to_string(),
            path: PathBuf::from("SKILL.md"),
        }
    }

    fn previous(hooks: Option<ExtensionHooks>, skills: Vec<Skill>) -> LoadedExtension {
        let manifest = manifest();
        LoadedExtension {
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            id: "id".to_string(),
            path: PathBuf::from("/ext"),
            install_dir: PathBuf::from("/ext"),
            install_metadata: None,
            context_files: Vec::new(),
            mcp_servers: BTreeMap::new(),
            exclude_tools: Vec::new(),
            themes: Vec::new(),
            hooks,
            skills,
            agents: Vec::new(),
            settings: Vec::new(),
            resolved_settings: Default::default(),
            is_active: true,
            manifest,
        }
    }

    #[test]
    fn summary_lists_servers_tools_hooks_and_skills() {
        let text = consent_summary(&manifest(), Some(&hooks("lint.sh")), &[skill("review", "b")]);

        assert!(text.contains("local: node server.js (local)"));
        assert!(text.contains("https://mcp.example.com (remote)"));
        assert!(text.contains("run_shell_command"));
        assert!(text.contains("[BeforeTool] lint.sh"));
        assert!(text.contains("review: d"));
        assert!(text.contains("GEMINI.md"));
    }

    #[test]
    fn fresh_install_always_requires_consent() {
        assert!(consent_required(None, None, &[]));
    }

    #[test]
    fn update_without_new_hooks_or_skills_needs_no_consent() {
        let prev = previous(Some(hooks("lint.sh")), vec![skill("a", "body")]);
        assert!(!consent_required(Some(&prev), Some(&hooks("lint.sh")), &[skill("a", "body")]));
        assert!(!consent_required(Some(&prev), None, &[]));
    }

    #[test]
    fn update_with_new_hook_or_changed_skill_needs_consent() {
        let prev = previous(None, vec![skill("a", "body")]);
        assert!(consent_required(Some(&prev), Some(&hooks("new.sh")), &[]));
        assert!(consent_required(Some(&prev), None, &[skill("a", "changed")]));
        assert!(consent_required(Some(&prev), None, &[skill("b", "body")]));
    }
}
