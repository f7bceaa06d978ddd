//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use git2::{Repository, Signature};
use ia_commits::config::{Configuration, Environment, Task};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Path the Gemini client posts to for the default model.
pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

/// Git's default commit template, as the hooks receive it.
pub const TEMPLATE: &str = concat!(
    "\n# Please enter the commit message for your changes. Lines starting\n",
    "# with '#' will be ignored, and an empty message aborts the commit.\n",
    "#\n",
    "# On branch main\n"
);

/// Environment pointing the Gemini provider at `server`.
pub fn gemini_env(server: &MockServer, extra: &[(&str, &str)]) -> Environment {
    let base_url = format!("{}/v1beta/models/", server.uri());
    let mut vars = vec![
        ("GEMINI_API_KEY".to_string(), "test-key".to_string()),
        ("API_BASE_URL".to_string(), base_url),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    vars.into_iter().collect()
}

/// Environment pointing the Ollama provider at `server`.
pub fn ollama_env(server: &MockServer, extra: &[(&str, &str)]) -> Environment {
    let mut vars = vec![
        ("AI_PROVIDER".to_string(), "ollama".to_string()),
        ("OLLAMA_URL".to_string(), server.uri()),
    ];
    vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    vars.into_iter().collect()
}

/// Resolve a configuration, panicking on error.
pub fn resolve(task: Task, env: &Environment) -> Configuration {
    Configuration::resolve(task, env).expect("Failed to resolve configuration")
}

/// A successful Gemini generateContent body carrying `text`.
pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

/// A successful non-streaming Ollama generate body carrying `text`.
pub fn ollama_body(text: &str) -> Value {
    json!({
        "model": "llama3",
        "created_at": "2024-05-01T10:00:00Z",
        "response": text,
        "done": true
    })
}

/// Write `content` to a commit message file in a fresh temp directory.
pub fn message_file(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("COMMIT_EDITMSG");
    std::fs::write(&path, content).expect("Failed to write message file");
    (dir, path)
}

/// A test git repository with helpers for staging changes.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` and add it to the index.
    pub fn stage(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit whatever is staged.
    pub fn commit(&self, message: &str) {
        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit");
    }
}
