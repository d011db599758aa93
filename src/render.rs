//! Manifest rendering through `kustomize build`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use kubediff_core::models::{AppPath, RenderedPair};
use thiserror::Error;

use crate::discovery::{is_kustomization_dir, DiscoveryError};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("directory {0} does not contain a kustomization file")]
    NotAKustomization(PathBuf),

    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("{binary} build {dir} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        dir: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("{binary} produced non UTF-8 output for {dir}")]
    InvalidOutput { binary: String, dir: PathBuf },

    #[error(transparent)]
    Fs(#[from] DiscoveryError),
}

/// Turns an application directory into the YAML it deploys.
pub trait ManifestRenderer {
    /// Render `dir`. Returns `Ok(None)` when the directory does not exist,
    /// meaning the app is absent from that branch.
    fn render(&self, dir: &Path) -> Result<Option<String>, RenderError>;
}

/// Runs `<binary> build --enable-helm <dir>` and captures stdout.
#[derive(Debug, Clone)]
pub struct KustomizeRenderer {
    binary: String,
}

impl KustomizeRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for KustomizeRenderer {
    fn default() -> Self {
        Self::new("kustomize")
    }
}

impl ManifestRenderer for KustomizeRenderer {
    fn render(&self, dir: &Path) -> Result<Option<String>, RenderError> {
        let exists = dir.try_exists().map_err(|source| DiscoveryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if !exists {
            return Ok(None);
        }
        if !is_kustomization_dir(dir)? {
            return Err(RenderError::NotAKustomization(dir.to_path_buf()));
        }

        tracing::debug!("Running {} build --enable-helm {}", self.binary, dir.display());
        let output = Command::new(&self.binary)
            .arg("build")
            .arg("--enable-helm")
            .arg(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RenderError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                binary: self.binary.clone(),
                dir: dir.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|_| RenderError::InvalidOutput {
                binary: self.binary.clone(),
                dir: dir.to_path_buf(),
            })
    }
}

/// Render one app on both branches. A missing side renders as empty text.
pub fn render_pair(
    renderer: &dyn ManifestRenderer,
    pr_root: &Path,
    target_root: &Path,
    app: &AppPath,
) -> Result<RenderedPair, RenderError> {
    tracing::info!("Building yaml for {}", app);
    let pr = renderer.render(&pr_root.join(app))?.unwrap_or_default();
    let target = renderer.render(&target_root.join(app))?.unwrap_or_default();
    Ok(RenderedPair {
        app: app.clone(),
        target,
        pr,
    })
}
