use kubediff_core::ChunkError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::detect::DetectError;
use crate::discovery::DiscoveryError;
use crate::github::RemoteError;
use crate::render::RenderError;

/// Any failure that ends a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("error finding apps: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("error checking for changes: {0}")]
    Detect(#[from] DetectError),

    #[error("error rendering manifests: {0}")]
    Render(#[from] RenderError),

    #[error("invalid chunk budget: {0}")]
    Chunk(#[from] ChunkError),

    #[error("error updating pull request comments: {0}")]
    Remote(#[from] RemoteError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
