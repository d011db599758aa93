//! Core building blocks for kubediff.
//!
//! Everything in this crate is pure and synchronous: no filesystem, process or
//! network access. The `kubediff` binary crate wires these pieces to the real
//! world.
//!
//! - [`models`]: application paths and sets, change records, diffs, chunks, comments.
//! - [`chunker`]: line-preserving packing of long text into budgeted pieces.
//! - [`diff`]: Myers line diff rendered as a unified diff.
//! - [`template`]: markdown comment template filling.

pub mod chunker;
pub mod diff;
pub mod models;
pub mod template;

pub use chunker::{ChunkError, Chunker};
pub use diff::unified_diff;
pub use template::{CommentTemplate, TemplateError};
