//! Command hooks declared by extensions
//!
//! Hooks live in `<extension>/hooks/hooks.json`:
//!
//! ```json
//! {
//!   "hooks": {
//!     "BeforeTool": [
//!       { "matcher": "write_file", "hooks": [{ "type": "command", "command": "${extensionPath}/lint.sh" }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Hooks are only loaded here. Running them is up to the host.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::variables::VariableContext;

pub const HOOKS_DIR: &str = "hooks";
pub const HOOKS_FILENAME: &str = "hooks.json";

/// Host lifecycle events a hook can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HookEventName {
    BeforeTool,
    AfterTool,
    BeforeAgent,
    AfterAgent,
    Notification,
    SessionStart,
    SessionEnd,
    PreCompress,
    BeforeModel,
    AfterModel,
    BeforeToolSelection,
}

impl fmt::Display for HookEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BeforeTool => "BeforeTool",
            Self::AfterTool => "AfterTool",
            Self::BeforeAgent => "BeforeAgent",
            Self::AfterAgent => "AfterAgent",
            Self::Notification => "Notification",
            Self::SessionStart => "SessionStart",
            Self::SessionEnd => "SessionEnd",
            Self::PreCompress => "PreCompress",
            Self::BeforeModel => "BeforeModel",
            Self::AfterModel => "AfterModel",
            Self::BeforeToolSelection => "BeforeToolSelection",
        };
        f.write_str(name)
    }
}

impl HookEventName {
    /// Parse an event name. Matching is exact.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BeforeTool" => Some(Self::BeforeTool),
            "AfterTool" => Some(Self::AfterTool),
            "BeforeAgent" => Some(Self::BeforeAgent),
            "AfterAgent" => Some(Self::AfterAgent),
            "Notification" => Some(Self::Notification),
            "SessionStart" => Some(Self::SessionStart),
            "SessionEnd" => Some(Self::SessionEnd),
            "PreCompress" => Some(Self::PreCompress),
            "BeforeModel" => Some(Self::BeforeModel),
            "AfterModel" => Some(Self::AfterModel),
            "BeforeToolSelection" => Some(Self::BeforeToolSelection),
            _ => None,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &[
            "BeforeTool",
            "AfterTool",
            "BeforeAgent",
            "AfterAgent",
            "Notification",
            "SessionStart",
            "SessionEnd",
            "PreCompress",
            "BeforeModel",
            "AfterModel",
            "BeforeToolSelection",
        ]
    }
}

/// A single command to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommand {
    pub command: String,
    /// Extra environment. Resolved extension settings are merged underneath.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Commands bound to one event, optionally filtered by a matcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookDefinition {
    pub matcher: Option<String>,
    pub sequential: bool,
    pub hooks: Vec<HookCommand>,
}

pub type ExtensionHooks = BTreeMap<HookEventName, Vec<HookDefinition>>;

#[derive(Deserialize)]
struct RawDefinition {
    #[serde(default)]
    matcher: Option<String>,
    #[serde(default)]
    sequential: bool,
    hooks: Vec<Value>,
}

#[derive(Deserialize)]
struct RawCommand {
    #[serde(rename = "type")]
    kind: String,
    command: String,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    timeout: Option<u64>,
}

pub fn hooks_path(extension_dir: &Path) -> PathBuf {
    extension_dir.join(HOOKS_DIR).join(HOOKS_FILENAME)
}

/// Load `hooks/hooks.json` from an extension directory.
///
/// A missing file yields `None`, as does any other read failure (logged).
/// Invalid JSON is an error. Unknown events and malformed entries are dropped.
pub async fn load_hooks(
    extension_dir: &Path,
    ctx: &VariableContext,
    settings_env: &BTreeMap<String, String>,
) -> Result<Option<ExtensionHooks>> {
    let path = hooks_path(extension_dir);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not read hooks file");
            return Ok(None);
        }
    };

    let mut value: Value = serde_json::from_str(&content).map_err(|e| Error::InvalidHooks {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    ctx.hydrate_value(&mut value);

    parse_hooks(value, &path, settings_env).map(Some)
}

/// Validate a hooks document.
pub fn parse_hooks(
    value: Value,
    path: &Path,
    settings_env: &BTreeMap<String, String>,
) -> Result<ExtensionHooks> {
    let events = match value {
        Value::Object(mut root) => match root.remove("hooks") {
            Some(Value::Object(events)) => events,
            None | Some(Value::Null) => return Ok(ExtensionHooks::new()),
            Some(_) => {
                return Err(Error::InvalidHooks {
                    path: path.to_path_buf(),
                    reason: "'hooks' must be an object keyed by event name".to_string(),
                });
            }
        },
        _ => {
            return Err(Error::InvalidHooks {
                path: path.to_path_buf(),
                reason: "hooks file must be a JSON object".to_string(),
            });
        }
    };

    let mut hooks = ExtensionHooks::new();
    for (event_name, entries) in events {
        let Some(event) = HookEventName::parse(&event_name) else {
            tracing::debug!(event = %event_name, "Ignoring unknown hook event");
            continue;
        };
        let Value::Array(entries) = entries else {
            tracing::warn!(event = %event, path = %path.display(), "Dropping hook event: expected a list");
            continue;
        };

        let definitions: Vec<HookDefinition> = entries
            .into_iter()
            .filter_map(|entry| parse_definition(entry, event, path, settings_env))
            .collect();
        if !definitions.is_empty() {
            hooks.insert(event, definitions);
        }
    }
    Ok(hooks)
}

fn parse_definition(
    entry: Value,
    event: HookEventName,
    path: &Path,
    settings_env: &BTreeMap<String, String>,
) -> Option<HookDefinition> {
    let raw: RawDefinition = match serde_json::from_value(entry) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(event = %event, path = %path.display(), error = %e, "Dropping malformed hook entry");
            return None;
        }
    };

    let mut commands = Vec::with_capacity(raw.hooks.len());
    for command in raw.hooks {
        match serde_json::from_value::<RawCommand>(command) {
            Ok(cmd) if cmd.kind == "command" => {
                let mut env = settings_env.clone();
                env.extend(cmd.env);
                commands.push(HookCommand {
                    command: cmd.command,
                    env,
                    timeout: cmd.timeout,
                });
            }
            Ok(cmd) => {
                tracing::warn!(event = %event, kind = %cmd.kind, "Dropping hook with unsupported type");
            }
            Err(e) => {
                tracing::warn!(event = %event, path = %path.display(), error = %e, "Dropping malformed hook command");
            }
        }
    }

    if commands.is_empty() {
        return None;
    }
    Some(HookDefinition {
        matcher: raw.matcher,
        sequential: raw.sequential,
        hooks: commands,
    })
}

/// Every command string, for consent summaries.
pub fn hook_commands(hooks: &ExtensionHooks) -> Vec<(HookEventName, &str)> {
    hooks
        .iter()
        .flat_map(|(event, definitions)| {
            definitions
                .iter()
                .flat_map(|d| d.hooks.iter())
                .map(move |h| (*event, h.command.as_str()))
        })
        .collect()
}
