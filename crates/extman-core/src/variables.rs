//! Template variable hydration for manifests, hooks, skills and agents.
//!
//! | Variable            | Resolved to                                  |
//! |---------------------|----------------------------------------------|
//! | `${extensionPath}`  | Absolute path of the extension directory      |
//! | `${workspacePath}`  | Absolute path of the current workspace        |
//! | `${/}`              | Platform path separator                       |
//! | `${pathSeparator}`  | Platform path separator                       |
//! | `${ENV_VAR}`        | Resolved setting value (hooks/skills/agents)  |
//!
//! Unknown variables are left untouched.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde_json::Value;

/// Values available for `${...}` substitution.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    vars: HashMap<String, String>,
}

impl VariableContext {
    /// Path variables for an extension rooted at `extension_path`.
    pub fn for_extension(extension_path: &Path, workspace_path: &Path) -> Self {
        let separator = std::path::MAIN_SEPARATOR.to_string();
        let mut vars = HashMap::new();
        vars.insert(
            "extensionPath".to_string(),
            extension_path.display().to_string(),
        );
        vars.insert(
            "workspacePath".to_string(),
            workspace_path.display().to_string(),
        );
        vars.insert("/".to_string(), separator.clone());
        vars.insert("pathSeparator".to_string(), separator);
        Self { vars }
    }

    /// Add setting values. Path variables keep precedence over settings of
    /// the same name.
    pub fn with_env(mut self, env: &BTreeMap<String, String>) -> Self {
        for (key, value) in env {
            self.vars
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Substitute `${name}` markers in a single left-to-right scan, so a
    /// substituted value is never expanded again.
    pub fn hydrate_str(&self, input: &str) -> String {
        let mut result = String::with_capacity(input.len());
        let mut remaining = input;

        while let Some(start) = remaining.find("${") {
            result.push_str(&remaining[..start]);

            match remaining[start + 2..].find('}') {
                Some(len) => {
                    let name = &remaining[start + 2..start + 2 + len];
                    match self.vars.get(name) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&remaining[start..start + 3 + len]),
                    }
                    remaining = &remaining[start + 3 + len..];
                }
                None => {
                    // Unterminated marker: copy verbatim
                    result.push_str(&remaining[start..]);
                    remaining = "";
                }
            }
        }

        result.push_str(remaining);
        result
    }

    /// Recursively hydrate every string inside a JSON tree.
    pub fn hydrate_value(&self, value: &mut Value) {
        match value {
            Value::String(s) => *s = self.hydrate_str(s),
            Value::Array(items) => items.iter_mut().for_each(|v| self.hydrate_value(v)),
            Value::Object(map) => map.values_mut().for_each(|v| self.hydrate_value(v)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> VariableContext {
        VariableContext::for_extension(Path::new("/ext/foo"), Path::new("/work"))
    }

    #[test]
    fn substitutes_path_variables() {
        let sep = std::path::MAIN_SEPARATOR;
        assert_eq!(
            ctx().hydrate_str("${extensionPath}${/}server.js"),
            format!("/ext/foo{sep}server.js")
        );
        assert_eq!(ctx().hydrate_str("cd ${workspacePath}"), "cd /work");
    }

    #[test]
    fn leaves_unknown_and_unterminated_markers() {
        assert_eq!(ctx().hydrate_str("${unknown} ok"), "${unknown} ok");
        assert_eq!(ctx().hydrate_str("tail ${oops"), "tail ${oops");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let mut env = BTreeMap::new();
        env.insert("TOKEN".to_string(), "${extensionPath}".to_string());
        let ctx = ctx().with_env(&env);
        assert_eq!(ctx.hydrate_str("${TOKEN}"), "${extensionPath}");
    }

    #[test]
    fn settings_cannot_shadow_path_variables() {
        let mut env = BTreeMap::new();
        env.insert("extensionPath".to_string(), "/elsewhere".to_string());
        let ctx = ctx().with_env(&env);
        assert_eq!(ctx.get("extensionPath"), Some("/ext/foo"));
    }

    #[test]
    fn hydrates_nested_json() {
        let mut value = json!({
            "command": "node",
            "args": ["${extensionPath}/index.js", 3],
            "env": { "ROOT": "${workspacePath}" }
        });
        ctx().hydrate_value(&mut value);
        assert_eq!(value["args"][0], "/ext/foo/index.js");
        assert_eq!(value["args"][1], 3);
        assert_eq!(value["env"]["ROOT"], "/work");
    }
}
