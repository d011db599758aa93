//! The end-to-end run: discover, detect, render, diff, chunk, comment.
//!
//! Everything up to chunking is [`Pipeline::plan`] and touches only the local
//! checkouts and the render tool. [`Pipeline::run`] adds the comment lifecycle
//! on top. Stages run strictly one after another and the first error ends the
//! run.

use kubediff_core::models::{AppSet, ChangeRecord, Chunk, DiffResult, RenderedPair};
use kubediff_core::{unified_diff, ChunkError, Chunker};

use crate::config::Config;
use crate::detect::ChangeDetector;
use crate::discovery::AppFinder;
use crate::error::Result;
use crate::github::CommentManager;
use crate::render::{render_pair, ManifestRenderer};

/// Everything a run would post, computed without touching the remote.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub apps: AppSet,
    pub changes: Vec<ChangeRecord>,
    pub diffs: Vec<DiffResult>,
    pub chunks: Vec<Chunk>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub plan: Plan,
    pub deleted: usize,
    pub posted: usize,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    renderer: &'a dyn ManifestRenderer,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, renderer: &'a dyn ManifestRenderer) -> Self {
        Self { config, renderer }
    }

    pub fn plan(&self) -> Result<Plan> {
        let apps = AppFinder::from_config(self.config).find_all()?;
        let changes = ChangeDetector::from_config(self.config).changed(&apps)?;

        let pr_root = self.config.pr_root();
        let target_root = self.config.target_root();
        let mut diffs = Vec::new();
        for change in &changes {
            let pair = render_pair(self.renderer, &pr_root, &target_root, &change.app)?;
            if let Some(diff) = diff_pair(&pair, self.config.diff_context_lines) {
                diffs.push(diff);
            } else {
                tracing::info!("Rendered output of {} is identical, skipping", change.app);
            }
        }

        let chunks = chunk_all(self.config.chunk_budget()?, &diffs)?;
        tracing::info!("{} diffs split into {} chunks", diffs.len(), chunks.len());

        Ok(Plan {
            apps,
            changes,
            diffs,
            chunks,
        })
    }

    /// Plan, then replace the previous run's comments with this run's chunks.
    pub async fn run(&self, comments: &CommentManager<'_>) -> Result<RunReport> {
        let plan = self.plan()?;

        let report = comments.sync(&plan.chunks).await?;
        tracing::info!(
            "Deleted {} old comments, posted {}",
            report.deleted,
            report.posted.len()
        );

        Ok(RunReport {
            plan,
            deleted: report.deleted,
            posted: report.posted.len(),
        })
    }
}

/// Diff target against PR. `None` when the renderings have the same lines.
pub fn diff_pair(pair: &RenderedPair, context: usize) -> Option<DiffResult> {
    let diff = unified_diff(&pair.target, &pair.pr, context);
    if diff.is_empty() {
        return None;
    }
    Some(DiffResult {
        app: pair.app.clone(),
        diff,
    })
}

/// Chunk every diff in order, numbering chunks across the whole run.
///
/// `budget` bounds the chunk text plus the app path it is titled with, newlines
/// included. The diff's own final newline is dropped first so the last chunk
/// does not gain an extra blank line.
pub fn chunk_all(budget: usize, diffs: &[DiffResult]) -> Result<Vec<Chunk>, ChunkError> {
    let mut chunks = Vec::new();
    for diff in diffs {
        let title_chars = diff.app.as_str().chars().count();
        let chunker = Chunker::new(budget.saturating_sub(title_chars))?.counting_terminators();
        tracing::debug!("Chunking {} with {} characters per comment", diff.app, chunker.max_chars());

        let text = diff.diff.strip_suffix('\n').unwrap_or(&diff.diff);
        for text in chunker.chunk(text) {
            chunks.push(Chunk {
                app: diff.app.clone(),
                text,
                ordinal: chunks.len(),
            });
        }
    }
    Ok(chunks)
}
