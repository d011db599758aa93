//! Pull request comments: the remote service and the lifecycle built on it.
//!
//! [`CommentService`] is the narrow surface consumed from GitHub (list, create,
//! delete). [`GitHubClient`] implements it over the REST API; tests substitute
//! in-memory doubles. [`CommentManager`] owns the delete-then-post lifecycle.

mod client;
mod lifecycle;

pub use client::*;
pub use lifecycle::*;

use async_trait::async_trait;
use kubediff_core::models::Comment;
use thiserror::Error;

/// Errors from the remote comment service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: check GITHUB_TOKEN")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{operation} returned {status}, expected {expected}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        expected: u16,
        body: String,
    },
}

/// Comment operations on a single pull request thread.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Every comment on the thread, oldest first, across all pages.
    async fn list_comments(&self) -> Result<Vec<Comment>, RemoteError>;

    async fn create_comment(&self, body: &str) -> Result<Comment, RemoteError>;

    async fn delete_comment(&self, id: u64) -> Result<(), RemoteError>;
}
