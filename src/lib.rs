//! kubediff: rendered manifest diffs as pull request comments.
//!
//! Two branches of a GitOps repository are checked out side by side. kubediff
//! finds every application under the environments root of either checkout,
//! renders the ones whose directories differ, diffs the rendered YAML, and
//! keeps one set of pull request comments in sync with the result.

pub mod config;
pub mod detect;
pub mod discovery;
pub mod error;
pub mod github;
pub mod pipeline;
pub mod render;

pub use error::{Error, Result};
