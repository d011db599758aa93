use serde::{Deserialize, Serialize};

/// Prefix of every marker this tool embeds in the comments it posts.
pub const DEFAULT_MARKER_PREFIX: &str = "bot-comment-kubediff";

/// A pull request comment as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
}

/// Hidden HTML comment used to recognize this tool's own pull request comments.
///
/// Rendered as `<!-- {prefix}-{ordinal} -->`. Matching only looks for the
/// `<!-- {prefix}-` part, so a comment is recognized no matter where it sits in
/// the listing or which ordinal it was posted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    prefix: String,
}

impl Marker {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn render(&self, ordinal: usize) -> String {
        format!("<!-- {}-{} -->", self.prefix, ordinal)
    }

    pub fn matches(&self, body: &str) -> bool {
        body.contains(&format!("<!-- {}-", self.prefix))
    }

    /// The ordinal embedded in `body`, if it carries this marker.
    pub fn ordinal_in(&self, body: &str) -> Option<usize> {
        let needle = format!("<!-- {}-", self.prefix);
        let start = body.find(&needle)? + needle.len();
        let rest = &body[start..];
        let end = rest.find(" -->")?;
        rest[..end].parse().ok()
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_PREFIX)
    }
}

/// Banner placed on the first comment when a run posts more than one.
pub fn split_banner(total: usize) -> String {
    format!("## Wow that's a lot of changes! They'll be split over {total} comments")
}

/// Assemble the final body of the `ordinal`-th comment out of `total`.
pub fn compose_body(marker: &Marker, rendered: &str, ordinal: usize, total: usize) -> String {
    let banner = if ordinal == 0 && total > 1 {
        split_banner(total)
    } else {
        String::new()
    };
    format!("\n{}\n{}\n{}\n", banner, rendered, marker.render(ordinal))
}
