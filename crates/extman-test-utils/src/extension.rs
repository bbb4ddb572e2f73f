//! [`TestExtension`] builder for extension source directories.

use std::fs;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Manifest file name the extension manager looks for.
pub const MANIFEST_FILE: &str = "gemini-extension.json";

/// A temporary extension source directory.
///
/// # Example
///
/// ```rust,no_run
/// use extman_test_utils::TestExtension;
///
/// let ext = TestExtension::new("foo", "1.0.0").with_context_file("# Foo");
/// assert!(ext.path().join("GEMINI.md").exists());
/// ```
pub struct TestExtension {
    dir: TempDir,
}

impl TestExtension {
    /// Create a source directory with a minimal `{name, version}` manifest.
    pub fn new(name: &str, version: &str) -> Self {
        Self::with_manifest(json!({ "name": name, "version": version }))
    }

    /// Create a source directory with an arbitrary manifest document.
    pub fn with_manifest(manifest: Value) -> Self {
        let ext = Self {
            dir: TempDir::new().unwrap(),
        };
        ext.write_manifest(&manifest);
        ext
    }

    /// Root of the extension source.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace the manifest document.
    pub fn write_manifest(&self, manifest: &Value) {
        self.write_file(MANIFEST_FILE, &serde_json::to_string_pretty(manifest).unwrap());
    }

    /// Write a file relative to the extension root, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestExtension: failed to write {}: {e}", path.display()));
    }

    /// Add the default `GEMINI.md` context file.
    pub fn with_context_file(self, content: &str) -> Self {
        self.write_file("GEMINI.md", content);
        self
    }

    /// Add `hooks/hooks.json`.
    pub fn with_hooks(self, hooks: Value) -> Self {
        self.write_file("hooks/hooks.json", &serde_json::to_string_pretty(&hooks).unwrap());
        self
    }

    /// Add `skills/<name>/SKILL.md` with front matter.
    pub fn with_skill(self, name: &str, description: &str, body: &str) -> Self {
        self.write_file(
            &format!("skills/{name}/SKILL.md"),
            &format!("---\nname: {name}\ndescription: {description}\n---\n{body}\n"),
        );
        self
    }

    /// Add `agents/<name>.md` with front matter.
    pub fn with_agent(self, name: &str, description: &str, prompt: &str) -> Self {
        self.write_file(
            &format!("agents/{name}.md"),
            &format!("---\nname: {name}\ndescription: {description}\n---\n{prompt}\n"),
        );
        self
    }
}
