//! Skills bundled in `<extension>/skills/<skill>/SKILL.md`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frontmatter;
use crate::variables::VariableContext;

pub const SKILLS_DIR: &str = "skills";
pub const SKILL_FILENAME: &str = "SKILL.md";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    /// Instructions, with variables hydrated.
    pub body: String,
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct SkillMeta {
    name: String,
    description: String,
}

/// Load every skill under `extension_dir`, sorted by name.
///
/// A skill that cannot be read or parsed is logged and skipped.
pub async fn load_skills(extension_dir: &Path, ctx: &VariableContext) -> Vec<Skill> {
    let root = extension_dir.join(SKILLS_DIR);
    let mut entries = match tokio::fs::read_dir(&root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %root.display(), error = %e, "Could not read skills directory");
            return Vec::new();
        }
    };

    let mut skills = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(path = %root.display(), error = %e, "Stopped reading skills directory");
                break;
            }
        };
        let path = entry.path().join(SKILL_FILENAME);
        if !tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            continue;
        }
        match load_skill(&path, ctx).await {
            Ok(skill) => skills.push(skill),
            Err(reason) => {
                tracing::warn!(path = %path.display(), reason = %reason, "Skipping invalid skill");
            }
        }
    }

    skills.sort_by(|a, b| a.name.cmp(&b.name));
    skills
}

async fn load_skill(path: &Path, ctx: &VariableContext) -> Result<Skill, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    let (meta, body) = frontmatter::parse::<SkillMeta>(&content)?;
    if meta.name.trim().is_empty() {
        return Err("skill name must not be empty".to_string());
    }
    Ok(Skill {
        name: meta.name,
        description: meta.description,
        body: ctx.hydrate_str(&body),
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use extman_test_utils::TestExtension;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn loads_skills_sorted_and_hydrated() {
        let ext = TestExtension::new("foo", "1.0.0")
            .with_skill("zeta", "Last", "Run ${extensionPath}/z.sh")
            .with_skill("alpha", "First", "Body");
        let ctx = VariableContext::for_extension(Path::new("/ext"), Path::new("/ws"));

        let skills = load_skills(ext.path(), &ctx).await;

        let names: Vec<_> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(skills[1].body.contains("/ext/z.sh"));
    }

    #[tokio::test]
    async fn invalid_skill_is_skipped() {
        let ext = TestExtension::new("foo", "1.0.0").with_skill("good", "Fine", "Body");
        ext.write_file("skills/bad/SKILL.md", "no front matter here");

        let skills = load_skills(ext.path(), &VariableContext::default()).await;

        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "good");
    }

    #[tokio::test]
    async fn no_skills_directory_is_empty() {
        let ext = TestExtension::new("foo", "1.0.0");
        assert!(load_skills(ext.path(), &VariableContext::default()).await.is_empty());
    }
}
