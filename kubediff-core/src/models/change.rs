use std::fmt;

use serde::{Deserialize, Serialize};

use super::AppPath;

/// Why an application was (or was not) selected for rendering.
///
/// - `MissingInPr`: The app only exists on the target branch (removed by the PR)
/// - `MissingInTarget`: The app only exists on the PR branch (added by the PR)
/// - `ContentDiffers`: Both branches have it, with different directory contents
/// - `Unchanged`: Both branches have byte-identical directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeReason {
    MissingInPr,
    MissingInTarget,
    ContentDiffers,
    Unchanged,
}

impl ChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInPr => "missing-in-pr",
            Self::MissingInTarget => "missing-in-target",
            Self::ContentDiffers => "content-differs",
            Self::Unchanged => "unchanged",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The change detector's verdict for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub app: AppPath,
    pub reason: ChangeReason,
}

impl ChangeRecord {
    pub fn new(app: AppPath, reason: ChangeReason) -> Self {
        Self { app, reason }
    }

    pub fn changed(&self) -> bool {
        self.reason.is_change()
    }
}
