//! Markdown template for a single diff comment.

use thiserror::Error;

/// Placeholder replaced with the application path.
pub const TITLE_PLACEHOLDER: &str = "{{TITLE}}";
/// Placeholder replaced with one diff chunk.
pub const DIFF_PLACEHOLDER: &str = "{{DIFF}}";

/// Built-in comment layout. Chunks always end in a newline, so the closing
/// fence lands on its own line.
pub const DEFAULT_TEMPLATE: &str = "### `{{TITLE}}`\n\n```diff\n{{DIFF}}```\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("comment template is missing the {DIFF_PLACEHOLDER} placeholder")]
    MissingDiffPlaceholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTemplate {
    source: String,
}

impl CommentTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        if !source.contains(DIFF_PLACEHOLDER) {
            return Err(TemplateError::MissingDiffPlaceholder);
        }
        Ok(Self { source })
    }

    /// Characters the template itself contributes to every comment, placeholders excluded.
    pub fn overhead_chars(&self) -> usize {
        self.source
            .replace(TITLE_PLACEHOLDER, "")
            .replace(DIFF_PLACEHOLDER, "")
            .chars()
            .count()
    }

    pub fn render(&self, title: &str, diff: &str) -> String {
        // the diff is spliced in verbatim, never run through placeholder substitution
        let (head, tail) = self
            .source
            .split_once(DIFF_PLACEHOLDER)
            .unwrap_or((self.source.as_str(), ""));
        format!(
            "{}{}{}",
            head.replace(TITLE_PLACEHOLDER, title),
            diff,
            tail.replace(TITLE_PLACEHOLDER, title)
        )
    }
}

impl Default for CommentTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
