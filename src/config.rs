//! Run configuration loaded from environment variables.
//!
//! Read once at startup; every component receives what it needs through its
//! constructor. Settings are looked up through a closure so tests can feed a
//! plain map instead of mutating the process environment.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use kubediff_core::CommentTemplate;
use thiserror::Error;

/// Remote message limit for a GitHub comment body, in characters.
pub const DEFAULT_MAX_COMMENT_LENGTH: usize = 65536;

/// Characters held back from each comment for the split banner, the marker and
/// the newlines around them.
pub const COMMENT_RESERVE: usize = 512;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read comment template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Settings for discovery, detection, rendering and chunking.
#[derive(Debug, Clone)]
pub struct Config {
    /// Checkout of the pull request branch (`PR_BRANCH_DIR`).
    pub pr_dir: PathBuf,
    /// Checkout of the branch the PR merges into (`TARGET_BRANCH_DIR`).
    pub target_dir: PathBuf,
    /// Environments root inside each checkout (`ENVS_DIR`).
    pub envs_dir: PathBuf,
    /// Number of `*` segments globbed under the environments root (`GLOB_LEVELS`).
    pub glob_levels: usize,
    pub diff_context_lines: usize,
    pub kustomize_bin: String,
    pub template: CommentTemplate,
    pub max_comment_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let glob_levels: usize = parse("GLOB_LEVELS", required(&lookup, "GLOB_LEVELS")?)?;
        if glob_levels == 0 {
            return Err(ConfigError::Invalid {
                key: "GLOB_LEVELS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let template = match non_empty(&lookup, "COMMENT_TEMPLATE_PATH") {
            Some(path) => load_template(Path::new(&path))?,
            None => CommentTemplate::default(),
        };

        let config = Self {
            pr_dir: non_empty(&lookup, "PR_BRANCH_DIR")
                .unwrap_or_else(|| "pr".to_string())
                .into(),
            target_dir: non_empty(&lookup, "TARGET_BRANCH_DIR")
                .unwrap_or_else(|| "target".to_string())
                .into(),
            envs_dir: required(&lookup, "ENVS_DIR")?.into(),
            glob_levels,
            diff_context_lines: optional(&lookup, "DIFF_CONTEXT_LINES", 3)?,
            kustomize_bin: non_empty(&lookup, "KUSTOMIZE_BIN")
                .unwrap_or_else(|| "kustomize".to_string()),
            template,
            max_comment_length: optional(
                &lookup,
                "MAX_COMMENT_LENGTH",
                DEFAULT_MAX_COMMENT_LENGTH,
            )?,
        };

        // surface an unusable budget at startup rather than mid-run
        config.chunk_budget()?;
        Ok(config)
    }

    /// Environments root of the PR branch.
    pub fn pr_root(&self) -> PathBuf {
        self.pr_dir.join(&self.envs_dir)
    }

    /// Environments root of the target branch.
    pub fn target_root(&self) -> PathBuf {
        self.target_dir.join(&self.envs_dir)
    }

    /// One-line description of the key settings for the startup log.
    pub fn summary(&self) -> String {
        let budget = match self.chunk_budget() {
            Ok(budget) => budget.to_string(),
            Err(_) => "no".to_string(),
        };
        format!(
            "comparing {} against {} at depth {}, rendering with {}, {} context lines, {} characters per comment",
            self.pr_root().display(),
            self.target_root().display(),
            self.glob_levels,
            self.kustomize_bin,
            self.diff_context_lines,
            budget
        )
    }

    /// Characters of app title plus chunk text, newlines included, that fit in
    /// one comment.
    pub fn chunk_budget(&self) -> Result<usize, ConfigError> {
        self.max_comment_length
            .checked_sub(self.template.overhead_chars() + COMMENT_RESERVE)
            .filter(|budget| *budget > 0)
            .ok_or_else(|| ConfigError::Invalid {
                key: "MAX_COMMENT_LENGTH",
                value: self.max_comment_length.to_string(),
                reason: format!(
                    "leaves no room for diff text after {} template and {} reserved characters",
                    self.template.overhead_chars(),
                    COMMENT_RESERVE
                ),
            })
    }
}

/// The pull request whose comments are managed.
#[derive(Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub token: String,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("pr_number", &self.pr_number)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: non_empty(&lookup, "GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            owner: required(&lookup, "GITHUB_OWNER")?,
            repo: required(&lookup, "GITHUB_REPO")?,
            pr_number: parse("GITHUB_PR_NUMBER", required(&lookup, "GITHUB_PR_NUMBER")?)?,
            token: required(&lookup, "GITHUB_TOKEN")?,
        })
    }
}

fn load_template(path: &Path) -> Result<CommentTemplate, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    CommentTemplate::new(source).map_err(|e| ConfigError::Invalid {
        key: "COMMENT_TEMPLATE_PATH",
        value: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Empty values count as unset.
fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    non_empty(lookup, key).ok_or(ConfigError::Missing(key))
}

fn optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(value) => parse(key, value),
        None => Ok(default),
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
