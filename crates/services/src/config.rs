use std::env;
use std::path::PathBuf;

use storage::github::GitHubConfig;

/// Default location of the question document, both on disk and inside the
/// remote repository.
pub const DEFAULT_QUESTIONS_PATH: &str = "data/questions.json";

/// Remote-commit posture derived from the environment.
#[derive(Debug, Clone)]
pub enum RemoteMode {
    /// No remote repository named; questions live in the local file only.
    Disabled,
    /// Repository and credential present; saves commit to GitHub.
    Configured(GitHubConfig),
    /// Repository named but no `GITHUB_TOKEN`; saving must be refused with a
    /// clear "not configured" answer instead of a mystery failure.
    Missing,
}

impl RemoteMode {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        matches!(self, RemoteMode::Configured(_))
    }
}

/// Question store settings, read from the environment.
///
/// Recognized variables: `QUESTIONS_PATH`, `GITHUB_TOKEN`, `GITHUB_OWNER`,
/// `GITHUB_REPO`, `GITHUB_BRANCH`. A missing `QUESTIONS_PATH` falls back to
/// [`DEFAULT_QUESTIONS_PATH`]; `GITHUB_BRANCH` falls back to `main`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub questions_path: PathBuf,
    pub remote: RemoteMode,
}

impl StoreConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Lets tests supply environments
    /// without touching the process env.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let questions_path = lookup("QUESTIONS_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_QUESTIONS_PATH.to_string());

        let owner = lookup("GITHUB_OWNER").filter(|v| !v.trim().is_empty());
        let repo = lookup("GITHUB_REPO").filter(|v| !v.trim().is_empty());
        let token = lookup("GITHUB_TOKEN").filter(|v| !v.trim().is_empty());

        let remote = match (owner, repo, token) {
            (Some(owner), Some(repo), Some(token)) => {
                let mut config = GitHubConfig::new(owner, repo, token).with_path(&questions_path);
                if let Some(branch) = lookup("GITHUB_BRANCH").filter(|v| !v.trim().is_empty()) {
                    config = config.with_branch(branch);
                }
                RemoteMode::Configured(config)
            }
            (None, None, _) => RemoteMode::Disabled,
            // A partially-specified remote is treated as intended-but-broken.
            _ => RemoteMode::Missing,
        };

        Self {
            questions_path: PathBuf::from(questions_path),
            remote,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> StoreConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn bare_environment_is_local_only_with_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.questions_path, PathBuf::from(DEFAULT_QUESTIONS_PATH));
        assert!(matches!(config.remote, RemoteMode::Disabled));
    }

    #[test]
    fn full_remote_environment_configures_github() {
        let config = config_from(&[
            ("GITHUB_TOKEN", "tok"),
            ("GITHUB_OWNER", "someone"),
            ("GITHUB_REPO", "quiz"),
            ("GITHUB_BRANCH", "deploy"),
        ]);
        match config.remote {
            RemoteMode::Configured(github) => {
                assert_eq!(github.owner, "someone");
                assert_eq!(github.repo, "quiz");
                assert_eq!(github.branch, "deploy");
                assert_eq!(github.path, DEFAULT_QUESTIONS_PATH);
            }
            other => panic!("expected configured remote, got {other:?}"),
        }
    }

    #[test]
    fn branch_defaults_to_main() {
        let config = config_from(&[
            ("GITHUB_TOKEN", "tok"),
            ("GITHUB_OWNER", "someone"),
            ("GITHUB_REPO", "quiz"),
        ]);
        match config.remote {
            RemoteMode::Configured(github) => assert_eq!(github.branch, "main"),
            other => panic!("expected configured remote, got {other:?}"),
        }
    }

    #[test]
    fn repo_without_token_is_missing_credentials() {
        let config = config_from(&[("GITHUB_OWNER", "someone"), ("GITHUB_REPO", "quiz")]);
        assert!(matches!(config.remote, RemoteMode::Missing));
        assert!(!config.remote.is_configured());
    }

    #[test]
    fn custom_questions_path_applies_to_both_local_and_remote() {
        let config = config_from(&[
            ("QUESTIONS_PATH", "content/trivia.json"),
            ("GITHUB_TOKEN", "tok"),
            ("GITHUB_OWNER", "someone"),
            ("GITHUB_REPO", "quiz"),
        ]);
        assert_eq!(config.questions_path, PathBuf::from("content/trivia.json"));
        match config.remote {
            RemoteMode::Configured(github) => assert_eq!(github.path, "content/trivia.json"),
            other => panic!("expected configured remote, got {other:?}"),
        }
    }
}
