use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use quiz_core::model::Question;

use crate::repository::{QuestionRecord, QuestionStore, StorageError};

const USER_AGENT: &str = "quiz-admin";
const COMMIT_MESSAGE: &str = "Update questions from admin editor";

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Where and how to commit the question document remotely.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Path of the JSON document inside the repository.
    pub path: String,
    pub token: String,
    /// Override for tests pointed at a local stub server.
    pub api_base: String,
}

impl GitHubConfig {
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: "main".to_string(),
            path: "data/questions.json".to_string(),
            token: token.into(),
            api_base: "https://api.github.com".to_string(),
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Remote-commit question store backed by the GitHub contents API.
///
/// Reads fetch the current file revision (`sha`) together with its content;
/// writes send the new document along with that prior revision marker so a
/// concurrent commit surfaces as a conflict instead of a silent overwrite.
pub struct GitHubStore {
    client: Client,
    config: GitHubConfig,
}

impl GitHubStore {
    #[must_use]
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.path
        )
    }

    /// Fetch the current file, or `None` if it does not exist yet.
    async fn read_contents(&self) -> Result<Option<ContentsResponse>, StorageError> {
        let response = self
            .client
            .get(self.contents_url())
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StorageError::Http(format!(
                "contents read failed with status {}",
                response.status()
            )));
        }

        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;
        Ok(Some(contents))
    }
}

#[async_trait]
impl QuestionStore for GitHubStore {
    async fn load(&self) -> Result<Vec<Question>, StorageError> {
        let contents = self.read_contents().await?.ok_or(StorageError::NotFound)?;
        let raw = decode_content(&contents.content)?;
        let records: Vec<QuestionRecord> =
            serde_json::from_slice(&raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        records
            .into_iter()
            .map(|r| r.into_question().map_err(StorageError::from))
            .collect()
    }

    async fn save(&self, questions: &[Question]) -> Result<(), StorageError> {
        let records: Vec<QuestionRecord> =
            questions.iter().map(QuestionRecord::from_question).collect();
        let body = serde_json::to_vec_pretty(&records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        // Prior revision marker; a brand-new file commits without one.
        let sha = self.read_contents().await?.map(|c| c.sha);

        let request = PutContentsRequest {
            message: COMMIT_MESSAGE,
            content: BASE64.encode(&body),
            branch: &self.config.branch,
            sha: sha.as_deref(),
        };

        tracing::debug!(
            owner = %self.config.owner,
            repo = %self.config.repo,
            path = %self.config.path,
            has_sha = sha.is_some(),
            "committing question file"
        );

        let response = self
            .client
            .put(self.contents_url())
            .bearer_auth(&self.config.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&request)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::warn!(path = %self.config.path, "remote commit conflicted");
                Err(StorageError::Conflict)
            }
            status => Err(StorageError::Http(format!(
                "contents write failed with status {status}"
            ))),
        }
    }
}

/// The contents API wraps base64 bodies at 60 columns; strip the line breaks
/// before decoding.
fn decode_content(content: &str) -> Result<Vec<u8>, StorageError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_url_targets_the_configured_document() {
        let config = GitHubConfig::new("owner", "repo", "token")
            .with_branch("deploy")
            .with_path("src/data/questions.json");
        let store = GitHubStore::new(config);
        assert_eq!(
            store.contents_url(),
            "https://api.github.com/repos/owner/repo/contents/src/data/questions.json"
        );
    }

    #[test]
    fn decode_content_handles_wrapped_base64() {
        let encoded = BASE64.encode(b"[{\"id\":\"q-1\"}]");
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        let decoded = decode_content(&wrapped).unwrap();
        assert_eq!(decoded, b"[{\"id\":\"q-1\"}]");
    }

    #[test]
    fn decode_content_rejects_garbage() {
        assert!(matches!(
            decode_content("not base64!!").unwrap_err(),
            StorageError::Serialization(_)
        ));
    }
}
