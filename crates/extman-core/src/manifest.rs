//! Extension manifest loading and validation for `gemini-extension.json`.
//!
//! The manifest is decoded in two steps: the file is parsed into an untyped
//! JSON tree, path variables are hydrated, and then every field is checked
//! explicitly before a typed [`ExtensionManifest`] is produced.
//!
//! # Example
//!
//! ```json
//! {
//!   "name": "my-extension",
//!   "version": "1.0.0",
//!   "contextFileName": ["GEMINI.md", "docs/CONTEXT.md"],
//!   "excludeTools": ["run_shell_command(rm -rf)"],
//!   "settings": [
//!     { "name": "API key", "description": "Service key", "envVar": "API_KEY", "sensitive": true }
//!   ],
//!   "mcpServers": {
//!     "my-server": { "command": "node", "args": ["${extensionPath}${/}server.js"] }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::variables::VariableContext;

/// Manifest file at the root of every extension.
pub const MANIFEST_FILENAME: &str = "gemini-extension.json";
/// Install metadata sidecar written next to an installed extension.
pub const INSTALL_METADATA_FILENAME: &str = ".gemini-extension-install.json";
/// Context file used when the manifest does not name one.
pub const DEFAULT_CONTEXT_FILENAME: &str = "GEMINI.md";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("static regex is valid"));

/// A configurable value an extension asks the user for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingDeclaration {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub env_var: String,
    #[serde(default)]
    pub sensitive: bool,
}

/// Validated extension manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    pub name: String,
    pub version: String,
    pub context_file_names: Vec<String>,
    pub exclude_tools: Vec<String>,
    pub settings: Vec<SettingDeclaration>,
    /// MCP server configs exactly as declared (including any `trust` flag).
    pub mcp_servers: BTreeMap<String, Value>,
    pub themes: Vec<Value>,
    pub hooks: Option<Value>,
}

/// Check an extension name against `[A-Za-z0-9-]+`.
pub fn validate_extension_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name must not be empty".to_string(),
        });
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "extension name may only contain letters, digits and hyphens".to_string(),
        });
    }
    Ok(())
}

impl ExtensionManifest {
    /// Read, hydrate and validate the manifest in `extension_dir`.
    pub async fn load(extension_dir: &Path, ctx: &VariableContext) -> Result<Self> {
        let path = extension_dir.join(MANIFEST_FILENAME);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ManifestNotFound { path });
            }
            Err(e) => return Err(extman_fs::Error::io(&path, e).into()),
        };
        Self::parse(&content, &path, ctx)
    }

    /// Parse manifest text. `path` is used for error messages only.
    pub fn parse(content: &str, path: &Path, ctx: &VariableContext) -> Result<Self> {
        let mut value: Value = serde_json::from_str(content).map_err(|e| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        ctx.hydrate_value(&mut value);
        Self::from_value(value, path)
    }

    /// Validate an untyped JSON tree field by field.
    pub fn from_value(value: Value, path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidManifest {
            path: path.to_path_buf(),
            reason,
        };

        let Value::Object(mut map) = value else {
            return Err(invalid("manifest must be a JSON object".to_string()));
        };

        let name = required_string(&mut map, "name").map_err(&invalid)?;
        validate_extension_name(&name)?;

        let version = required_string(&mut map, "version").map_err(&invalid)?;
        if version.trim().is_empty() {
            return Err(invalid("'version' must not be empty".to_string()));
        }

        let context_file_names = match map.remove("contextFileName") {
            None | Some(Value::Null) => vec![DEFAULT_CONTEXT_FILENAME.to_string()],
            Some(Value::String(s)) => vec![s],
            Some(Value::Array(items)) => {
                string_list(items, "contextFileName").map_err(&invalid)?
            }
            Some(_) => {
                return Err(invalid(
                    "'contextFileName' must be a string or a list of strings".to_string(),
                ));
            }
        };

        let exclude_tools = match map.remove("excludeTools") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => string_list(items, "excludeTools").map_err(&invalid)?,
            Some(_) => return Err(invalid("'excludeTools' must be a list of strings".to_string())),
        };

        let settings = match map.remove("settings") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => parse_settings(items).map_err(&invalid)?,
            Some(_) => return Err(invalid("'settings' must be a list".to_string())),
        };

        let mcp_servers = match map.remove("mcpServers") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(servers)) => {
                let mut parsed = BTreeMap::new();
                for (server, config) in servers {
                    if !config.is_object() {
                        return Err(invalid(format!(
                            "mcpServers.{server} must be an object"
                        )));
                    }
                    parsed.insert(server, config);
                }
                parsed
            }
            Some(_) => return Err(invalid("'mcpServers' must be an object".to_string())),
        };

        let themes = match map.remove("themes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(invalid("'themes' must be a list".to_string())),
        };

        let hooks = map.remove("hooks").filter(|v| !v.is_null());

        Ok(Self {
            name,
            version,
            context_file_names,
            exclude_tools,
            settings,
            mcp_servers,
            themes,
            hooks,
        })
    }

    /// MCP server configs with the `trust` field removed.
    ///
    /// Extensions may not mark their own servers as trusted.
    pub fn exposed_mcp_servers(&self) -> BTreeMap<String, Value> {
        self.mcp_servers
            .iter()
            .map(|(name, config)| {
                let mut config = config.clone();
                if let Value::Object(map) = &mut config {
                    map.remove("trust");
                }
                (name.clone(), config)
            })
            .collect()
    }

    /// Context file paths under `extension_dir`, in declaration order.
    pub fn context_file_paths(&self, extension_dir: &Path) -> Vec<PathBuf> {
        self.context_file_names
            .iter()
            .map(|file| extension_dir.join(file))
            .collect()
    }
}

fn required_string(map: &mut Map<String, Value>, key: &str) -> std::result::Result<String, String> {
    match map.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("'{key}' must be a string")),
        None => Err(format!("missing required field '{key}'")),
    }
}

fn string_list(items: Vec<Value>, field: &str) -> std::result::Result<Vec<String>, String> {
    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(format!("'{field}' entries must be strings")),
        })
        .collect()
}

fn parse_settings(items: Vec<Value>) -> std::result::Result<Vec<SettingDeclaration>, String> {
    let mut seen = HashSet::new();
    let mut settings = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let setting: SettingDeclaration = serde_json::from_value(item)
            .map_err(|e| format!("settings[{index}] is invalid: {e}"))?;
        if setting.env_var.trim().is_empty() {
            return Err(format!("settings[{index}].envVar must not be empty"));
        }
        if !seen.insert(setting.env_var.clone()) {
            return Err(format!(
                "settings[{index}].envVar '{}' is declared more than once",
                setting.env_var
            ));
        }
        settings.push(setting);
    }

    Ok(settings)
}
