use serde::{Deserialize, Serialize};

use super::AppPath;

/// Both branch renderings of one application.
///
/// An empty side means the application does not exist on that branch, so the
/// diff shows a full creation or deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedPair {
    pub app: AppPath,
    pub target: String,
    pub pr: String,
}

/// The unified diff of one changed application. Never holds an empty diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub app: AppPath,
    pub diff: String,
}

/// A budget-sized slice of a diff.
///
/// `ordinal` counts across every chunk of the run, not per application, and is
/// what the comment marker embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub app: AppPath,
    pub text: String,
    pub ordinal: usize,
}
