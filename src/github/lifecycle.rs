//! Delete-then-post lifecycle for this tool's pull request comments.
//!
//! A run first removes every comment a previous run left behind (recognized by
//! the marker prefix, wherever the comment sits in the thread), and only then
//! posts one comment per chunk. The thread never shows an old and a new diff
//! set side by side. A failure in either phase stops the run where it is:
//! nothing is retried or rolled back.

use kubediff_core::models::{compose_body, Chunk, Comment, Marker};
use kubediff_core::CommentTemplate;

use super::{CommentService, RemoteError};

/// What a full sync did to the thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub deleted: usize,
    pub posted: Vec<Comment>,
}

pub struct CommentManager<'a> {
    service: &'a dyn CommentService,
    marker: Marker,
    template: CommentTemplate,
}

impl<'a> CommentManager<'a> {
    pub fn new(
        service: &'a dyn CommentService,
        marker: Marker,
        template: CommentTemplate,
    ) -> Self {
        Self {
            service,
            marker,
            template,
        }
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Delete every comment carrying this tool's marker. Returns how many went.
    pub async fn delete_previous(&self) -> Result<usize, RemoteError> {
        tracing::info!("Listing comments");
        let comments = self.service.list_comments().await?;
        tracing::info!(
            "Found {} comments, deleting those marked {}",
            comments.len(),
            self.marker.prefix()
        );

        let mut deleted = 0;
        for comment in comments {
            if !self.marker.matches(&comment.body) {
                tracing::debug!("Skipping comment {}", comment.id);
                continue;
            }
            self.service.delete_comment(comment.id).await?;
            match self.marker.ordinal_in(&comment.body) {
                Some(ordinal) => tracing::info!("Deleted comment {} (chunk {})", comment.id, ordinal),
                None => tracing::info!("Deleted comment {}", comment.id),
            }
            deleted += 1;
        }
        Ok(deleted)
    }

    /// The exact body the chunk will be posted with.
    pub fn body_for(&self, chunk: &Chunk, total: usize) -> String {
        let rendered = self.template.render(chunk.app.as_str(), &chunk.text);
        compose_body(&self.marker, &rendered, chunk.ordinal, total)
    }

    /// Post one comment per chunk, in order.
    pub async fn post(&self, chunks: &[Chunk]) -> Result<Vec<Comment>, RemoteError> {
        let total = chunks.len();
        let mut posted = Vec::with_capacity(total);
        for chunk in chunks {
            let body = self.body_for(chunk, total);
            tracing::info!(
                "Posting comment {}/{} for {}",
                chunk.ordinal + 1,
                total,
                chunk.app
            );
            let comment = self.service.create_comment(&body).await?;
            tracing::info!("Posted comment, id: {}", comment.id);
            posted.push(comment);
        }
        Ok(posted)
    }

    /// Replace the previous run's comments with `chunks`.
    pub async fn sync(&self, chunks: &[Chunk]) -> Result<SyncReport, RemoteError> {
        let deleted = self.delete_previous().await?;
        let posted = self.post(chunks).await?;
        Ok(SyncReport { deleted, posted })
    }
}
