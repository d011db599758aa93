//! Domain models for kubediff.
//!
//! # Run-scoped Entities
//!
//! These live for one run and are discarded when it ends:
//!
//! - [`AppPath`]: An application directory, relative to the environments root.
//! - [`AppSet`]: A sorted, duplicate-free set of application paths.
//! - [`ChangeRecord`]: Whether (and why) one application differs between branches.
//! - [`RenderedPair`]: Both branch renderings of one changed application.
//! - [`DiffResult`]: The unified diff of one changed application.
//! - [`Chunk`]: A budget-sized slice of a diff, numbered across the whole run.
//!
//! ## Remote Entities
//!
//! - [`Comment`]: A pull request comment. The only thing that outlives a run;
//!   comments this tool posted carry a [`Marker`] so the next run can find them.

mod app;
mod change;
mod comment;
mod rendered;

pub use app::*;
pub use change::*;
pub use comment::*;
pub use rendered::*;
