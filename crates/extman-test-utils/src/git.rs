//! Git repository fixtures.

use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};

/// Initialise a git repository at `path` and commit everything in it.
///
/// Returns the repository so tests can add tags or further commits.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(path: &Path, message: &str) -> Repository {
    let repo = match Repository::open(path) {
        Ok(repo) => repo,
        Err(_) => Repository::init(path).unwrap_or_else(|e| {
            panic!("commit_all: failed to init repository at {}: {e}", path.display())
        }),
    };

    {
        let mut index = repo.index().expect("commit_all: index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("commit_all: add_all");
        index.write().expect("commit_all: write index");
        let tree_id = index.write_tree().expect("commit_all: write tree");
        let tree = repo.find_tree(tree_id).expect("commit_all: find tree");
        let signature = Signature::now("Test User", "test@test.com").expect("commit_all: sig");

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .expect("commit_all: commit");
    }

    repo
}

/// Tag the current HEAD of `repo` with a lightweight tag.
pub fn tag_head(repo: &Repository, name: &str) {
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .expect("tag_head: HEAD commit");
    repo.tag_lightweight(name, head.as_object(), false)
        .expect("tag_head: create tag");
}

/// File URL that git2 can clone from.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
