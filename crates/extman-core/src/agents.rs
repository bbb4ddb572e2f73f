//! Sub-agents bundled in `<extension>/agents/<agent>.md`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frontmatter;
use crate::variables::VariableContext;

pub const AGENTS_DIR: &str = "agents";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub name: String,
    pub description: String,
    pub model: Option<String>,
    pub tools: Vec<String>,
    /// System prompt, with variables hydrated.
    pub prompt: String,
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct AgentMeta {
    name: String,
    description: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    tools: Vec<String>,
}

/// Load every `*.md` agent under `extension_dir`, sorted by name.
///
/// Unreadable or malformed agents are logged and skipped.
pub async fn load_agents(extension_dir: &Path, ctx: &VariableContext) -> Vec<Agent> {
    let root = extension_dir.join(AGENTS_DIR);
    let mut entries = match tokio::fs::read_dir(&root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %root.display(), error = %e, "Could not read agents directory");
            return Vec::new();
        }
    };

    let mut agents = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable agent");
                continue;
            }
        };
        match frontmatter::parse::<AgentMeta>(&content) {
            Ok((meta, prompt)) => agents.push(Agent {
                name: meta.name,
                description: meta.description,
                model: meta.model,
                tools: meta.tools,
                prompt: ctx.hydrate_str(&prompt),
                path,
            }),
            Err(reason) => {
                tracing::warn!(path = %path.display(), reason = %reason, "Skipping invalid agent");
            }
        }
    }

    agents.sort_by(|a, b| a.name.cmp(&b.name));
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use extman_test_utils::TestExtension;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn loads_agents_with_optional_fields() {
        let ext = TestExtension::new("foo", "1.0.0").with_agent("reviewer", "Reviews code", "Use ${TOKEN}");
        ext.write_file(
            "agents/planner.md",
            "---\nname: planner\ndescription: Plans\nmodel: fast\ntools: [read_file, grep]\n---\nPlan it.\n",
        );
        let mut env = BTreeMap::new();
        env.insert("TOKEN".to_string(), "real-secret".to_string());
        let ctx = VariableContext::default().with_env(&env);

        let agents = load_agents(ext.path(), &ctx).await;

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "planner");
        assert_eq!(agents[0].model.as_deref(), Some("fast"));
        assert_eq!(agents[0].tools, vec!["read_file", "grep"]);
        assert_eq!(agents[1].prompt.trim(), "Use real-secret");
    }

    #[tokio::test]
    async fn malformed_agents_and_other_files_are_ignored() {
        let ext = TestExtension::new("foo", "1.0.0").with_agent("ok", "Fine", "Prompt");
        ext.write_file("agents/broken.md", "---\nname: [unclosed\n---\n");
        ext.write_file("agents/notes.txt", "not an agent");

        let agents = load_agents(ext.path(), &VariableContext::default()).await;

        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "ok");
    }
}
