//! Live adapter for the `RepoHost` port against the GitHub REST API.
//!
//! Publishing uses the git data API so a push is a true full-tree replace:
//! blobs are uploaded, a tree is built without a base tree, a commit is
//! created on top of the branch head, and the branch ref is force-updated.

use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};

use crate::ports::repo_host::{CreatedRepo, HostFuture, HostedSite, RepoHost};
use crate::snapshot::FileContext;

const API_BASE: &str = "https://api.github.com";
const BRANCH: &str = "main";
const USER_AGENT: &str = "pagewright";

type HostError = Box<dyn std::error::Error + Send + Sync>;

/// Live repository host backed by the GitHub API.
pub struct GitHubHost {
    client: Client,
    token: String,
    owner: String,
}

impl GitHubHost {
    /// Creates a new GitHub host for the given account.
    #[must_use]
    pub fn new(token: String, owner: String) -> Self {
        Self { client: Client::new(), token, owner }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{API_BASE}{path}"))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
        context: &str,
    ) -> Result<Value, HostError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| -> HostError { format!("{context}: request failed: {e}").into() })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| -> HostError { format!("{context}: failed to read response: {e}").into() })?;
        if !status.is_success() {
            return Err(format!("{context} failed ({}): {text}", status.as_u16()).into());
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| format!("{context}: unexpected response shape: {e}").into())
    }

    async fn create_repo(&self, name: String) -> Result<CreatedRepo, HostError> {
        // auto_init gives the branch an initial commit for push to build on.
        let body = json!({
            "name": name,
            "auto_init": true,
            "description": "Generated static site",
            "has_issues": false,
            "has_wiki": false,
        });
        let resp = self
            .send(reqwest::Method::POST, "/user/repos", Some(body), "repository create")
            .await?;
        let repo_url = resp["html_url"]
            .as_str()
            .ok_or("repository create: no html_url in response")?
            .to_string();
        Ok(CreatedRepo { repo_url })
    }

    async fn fetch_files(&self, name: String) -> Result<Vec<FileContext>, HostError> {
        let owner = &self.owner;
        let tree = self
            .send(
                reqwest::Method::GET,
                &format!("/repos/{owner}/{name}/git/trees/{BRANCH}?recursive=1"),
                None,
                "tree fetch",
            )
            .await?;
        let entries = tree["tree"].as_array().ok_or("tree fetch: no tree in response")?;

        let mut files = Vec::new();
        for entry in entries {
            if entry["type"].as_str() != Some("blob") {
                continue;
            }
            let path = entry["path"].as_str().ok_or("tree fetch: blob without a path")?;
            let sha = entry["sha"].as_str().ok_or("tree fetch: blob without a sha")?;
            let blob = self
                .send(
                    reqwest::Method::GET,
                    &format!("/repos/{owner}/{name}/git/blobs/{sha}"),
                    None,
                    "blob fetch",
                )
                .await?;
            let encoded = blob["content"].as_str().ok_or("blob fetch: no content")?;
            // GitHub wraps blob base64 at 60 columns.
            let compact: String = encoded.split_whitespace().collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| format!("blob fetch: invalid base64 for {path}: {e}"))?;
            let content = String::from_utf8(bytes)
                .map_err(|e| format!("blob fetch: {path} is not valid UTF-8: {e}"))?;
            files.push(FileContext { file_name: path.to_string(), file_content: content });
        }

        if files.is_empty() {
            return Err(format!("repository {name} has no files on {BRANCH}").into());
        }
        Ok(files)
    }

    async fn push_files(
        &self,
        name: String,
        files: Vec<FileContext>,
    ) -> Result<String, HostError> {
        let owner = &self.owner;
        let head = self
            .send(
                reqwest::Method::GET,
                &format!("/repos/{owner}/{name}/git/ref/heads/{BRANCH}"),
                None,
                "branch head fetch",
            )
            .await?;
        let parent = head["object"]["sha"]
            .as_str()
            .ok_or("branch head fetch: no commit sha")?
            .to_string();

        let mut tree_entries = Vec::with_capacity(files.len());
        for file in &files {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(file.file_content.as_bytes());
            let blob = self
                .send(
                    reqwest::Method::POST,
                    &format!("/repos/{owner}/{name}/git/blobs"),
                    Some(json!({"content": encoded, "encoding": "base64"})),
                    "blob create",
                )
                .await?;
            let sha = blob["sha"].as_str().ok_or("blob create: no sha in response")?;
            tree_entries.push(json!({
                "path": file.file_name,
                "mode": "100644",
                "type": "blob",
                "sha": sha,
            }));
        }

        // No base_tree: the new tree is exactly the snapshot, nothing more.
        let tree = self
            .send(
                reqwest::Method::POST,
                &format!("/repos/{owner}/{name}/git/trees"),
                Some(json!({"tree": tree_entries})),
                "tree create",
            )
            .await?;
        let tree_sha = tree["sha"].as_str().ok_or("tree create: no sha in response")?;

        let commit = self
            .send(
                reqwest::Method::POST,
                &format!("/repos/{owner}/{name}/git/commits"),
                Some(json!({
                    "message": "Publish generated site",
                    "tree": tree_sha,
                    "parents": [parent],
                })),
                "commit create",
            )
            .await?;
        let commit_sha = commit["sha"]
            .as_str()
            .ok_or("commit create: no sha in response")?
            .to_string();

        self.send(
            reqwest::Method::PATCH,
            &format!("/repos/{owner}/{name}/git/refs/heads/{BRANCH}"),
            Some(json!({"sha": commit_sha, "force": true})),
            "ref update",
        )
        .await?;

        Ok(commit_sha)
    }

    async fn enable_pages(&self, name: String) -> Result<HostedSite, HostError> {
        let owner = &self.owner;
        let path = format!("/repos/{owner}/{name}/pages");
        let body = json!({"source": {"branch": BRANCH, "path": "/"}});

        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&body)
            .send()
            .await
            .map_err(|e| -> HostError { format!("pages enable: request failed: {e}").into() })?;
        let status = response.status();
        // 409 means pages is already enabled for this repository.
        if !status.is_success() && status.as_u16() != 409 {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("pages enable failed ({}): {text}", status.as_u16()).into());
        }

        let pages_url = match self.send(reqwest::Method::GET, &path, None, "pages fetch").await {
            Ok(info) => info["html_url"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://{owner}.github.io/{name}/")),
            Err(_) => format!("https://{owner}.github.io/{name}/"),
        };

        Ok(HostedSite { pages_url, repo_url: format!("https://github.com/{owner}/{name}") })
    }
}

impl RepoHost for GitHubHost {
    fn create(&self, name: &str) -> HostFuture<'_, CreatedRepo> {
        let name = name.to_string();
        Box::pin(async move { self.create_repo(name).await })
    }

    fn fetch(&self, name: &str) -> HostFuture<'_, Vec<FileContext>> {
        let name = name.to_string();
        Box::pin(async move { self.fetch_files(name).await })
    }

    fn push(&self, name: &str, files: &[FileContext]) -> HostFuture<'_, String> {
        let name = name.to_string();
        let files = files.to_vec();
        Box::pin(async move { self.push_files(name, files).await })
    }

    fn enable_hosting(&self, name: &str) -> HostFuture<'_, HostedSite> {
        let name = name.to_string();
        Box::pin(async move { self.enable_pages(name).await })
    }
}
