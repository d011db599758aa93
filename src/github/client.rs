//! HTTP client for the GitHub issue comments API.
//!
//! Pull request conversation comments are issue comments, so every call goes
//! through `/repos/{owner}/{repo}/issues/...`. Configuration comes from
//! [`GitHubConfig`]:
//! - `GITHUB_API_URL` - Base URL (default: `https://api.github.com`)
//! - `GITHUB_OWNER`, `GITHUB_REPO`, `GITHUB_PR_NUMBER` - The thread to manage
//! - `GITHUB_TOKEN` - Bearer token

use async_trait::async_trait;
use kubediff_core::models::Comment;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::{CommentService, RemoteError};
use crate::config::GitHubConfig;

/// Largest page size the comments API accepts.
pub const PAGE_SIZE: usize = 100;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("kubediff/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client bound to one pull request.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    base_url: String,
    owner: String,
    repo: String,
    pr_number: u64,
    token: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            pr_number: config.pr_number,
            token: config.token.clone(),
            client: Client::new(),
        }
    }

    /// Build a request with auth and API headers.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn comments_path(&self) -> String {
        format!(
            "/repos/{}/{}/issues/{}/comments",
            self.owner, self.repo, self.pr_number
        )
    }

    /// Fail unless the response carries exactly `expected`.
    async fn check_status(
        &self,
        operation: &'static str,
        expected: StatusCode,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Err(RemoteError::Unauthorized),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(body)),
            _ => Err(RemoteError::UnexpectedStatus {
                operation,
                status: status.as_u16(),
                expected: expected.as_u16(),
                body,
            }),
        }
    }

    async fn json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        expected: StatusCode,
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = self.check_status(operation, expected, response).await?;
        Ok(response.json().await?)
    }

    async fn list_page(&self, page: usize) -> Result<Vec<Comment>, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, &self.comments_path())
            .query(&[("per_page", PAGE_SIZE), ("page", page)])
            .send()
            .await?;
        self.json("list comments", StatusCode::OK, response).await
    }
}

#[async_trait]
impl CommentService for GitHubClient {
    async fn list_comments(&self) -> Result<Vec<Comment>, RemoteError> {
        let mut comments = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.list_page(page).await?;
            tracing::debug!("Fetched {} comments from page {}", batch.len(), page);
            let last = batch.len() < PAGE_SIZE;
            comments.extend(batch);
            if last {
                break;
            }
            page += 1;
        }
        Ok(comments)
    }

    async fn create_comment(&self, body: &str) -> Result<Comment, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, &self.comments_path())
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        self.json("create comment", StatusCode::CREATED, response)
            .await
    }

    async fn delete_comment(&self, id: u64) -> Result<(), RemoteError> {
        let path = format!(
            "/repos/{}/{}/issues/comments/{}",
            self.owner, self.repo, id
        );
        let response = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await?;
        self.check_status("delete comment", StatusCode::NO_CONTENT, response)
            .await?;
        Ok(())
    }
}
