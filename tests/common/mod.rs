//! Shared fixtures: fixture trees, a fake render tool and an in-memory comment thread.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kubediff::github::{CommentService, RemoteError};
use kubediff::render::{ManifestRenderer, RenderError};
use kubediff_core::models::Comment;

/// Write `files` (name, content) into `dir`, creating it.
pub fn write_app(dir: &Path, files: &[(&str, &str)]) {
    std::fs::create_dir_all(dir).expect("Failed to create app dir");
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }
}

/// Stand-in for kustomize: concatenates the directory's files in name order.
pub struct ConcatRenderer;

impl ManifestRenderer for ConcatRenderer {
    fn render(&self, dir: &Path) -> Result<Option<String>, RenderError> {
        if !dir.exists() {
            return Ok(None);
        }
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .expect("Failed to read dir")
            .map(|e| e.expect("Failed to read entry").path())
            .filter(|p| p.is_file())
            .collect();
        names.sort();
        let mut out = String::new();
        for path in names {
            out.push_str(&std::fs::read_to_string(path).expect("Failed to read file"));
        }
        Ok(Some(out))
    }
}

/// Renderer that must never be reached.
pub struct PanicRenderer;

impl ManifestRenderer for PanicRenderer {
    fn render(&self, dir: &Path) -> Result<Option<String>, RenderError> {
        panic!("unexpected render of {}", dir.display());
    }
}

/// In-memory pull request thread.
#[derive(Default)]
pub struct FakeThread {
    comments: Mutex<Vec<Comment>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    fail_create_after: Mutex<Option<usize>>,
    fail_delete: Mutex<bool>,
}

impl FakeThread {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            ..Default::default()
        }
    }

    /// Seed the thread with comments written by someone else (or a prior run).
    pub fn with_comments(bodies: &[&str]) -> Self {
        let thread = Self::new();
        for body in bodies {
            thread.push(body);
        }
        thread
    }

    pub fn push(&self, body: &str) -> Comment {
        let comment = Comment {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            body: body.to_string(),
        };
        self.comments.lock().unwrap().push(comment.clone());
        comment
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.comments.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.comments().into_iter().map(|c| c.body).collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Let `n` creates succeed, then answer every further create with a 422.
    pub fn fail_create_after(&self, n: usize) {
        *self.fail_create_after.lock().unwrap() = Some(n);
    }

    pub fn fail_deletes(&self) {
        *self.fail_delete.lock().unwrap() = true;
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CommentService for FakeThread {
    async fn list_comments(&self) -> Result<Vec<Comment>, RemoteError> {
        self.record("list".to_string());
        Ok(self.comments())
    }

    async fn create_comment(&self, body: &str) -> Result<Comment, RemoteError> {
        self.record("create".to_string());
        let mut limit = self.fail_create_after.lock().unwrap();
        if let Some(remaining) = limit.as_mut() {
            if *remaining == 0 {
                return Err(RemoteError::UnexpectedStatus {
                    operation: "create comment",
                    status: 422,
                    expected: 201,
                    body: "Validation Failed".to_string(),
                });
            }
            *remaining -= 1;
        }
        drop(limit);
        Ok(self.push(body))
    }

    async fn delete_comment(&self, id: u64) -> Result<(), RemoteError> {
        self.record(format!("delete {id}"));
        if *self.fail_delete.lock().unwrap() {
            return Err(RemoteError::UnexpectedStatus {
                operation: "delete comment",
                status: 403,
                expected: 204,
                body: "Forbidden".to_string(),
            });
        }
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        if comments.len() == before {
            return Err(RemoteError::NotFound(format!("comment {id}")));
        }
        Ok(())
    }
}
