//! Application discovery across the two branch checkouts.
//!
//! An application is any directory exactly `glob_levels` levels below the
//! environments root. Both roots are globbed, the results are merged, and
//! applications nested inside a composite parent (a parent directory that is
//! itself a kustomization) are dropped because the parent build already covers
//! them.

use std::path::{Path, PathBuf};

use kubediff_core::models::{AppPath, AppSet};
use thiserror::Error;

use crate::config::Config;

/// File names kustomize recognizes as a kustomization.
pub const KUSTOMIZATION_FILES: [&str; 3] =
    ["kustomization.yaml", "kustomization.yml", "Kustomization"];

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path {0} is not valid UTF-8")]
    NonUtf8(PathBuf),

    #[error("glob match {path} is not below {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl From<glob::GlobError> for DiscoveryError {
    fn from(e: glob::GlobError) -> Self {
        let path = e.path().to_path_buf();
        Self::Io {
            path,
            source: e.into_error(),
        }
    }
}

pub struct AppFinder {
    pr_root: PathBuf,
    target_root: PathBuf,
    glob_levels: usize,
}

impl AppFinder {
    pub fn new(
        pr_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        glob_levels: usize,
    ) -> Self {
        Self {
            pr_root: pr_root.into(),
            target_root: target_root.into(),
            glob_levels,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pr_root(), config.target_root(), config.glob_levels)
    }

    /// Every application found in either branch, minus composite children.
    pub fn find_all(&self) -> Result<AppSet, DiscoveryError> {
        let pr_apps = self.find_in(&self.pr_root)?;
        let target_apps = self.find_in(&self.target_root)?;
        tracing::info!(
            "Found {} apps in PR branch, {} in target branch",
            pr_apps.len(),
            target_apps.len()
        );

        let mut apps = pr_apps.union(&target_apps);
        let composite_children = apps
            .iter()
            .filter_map(|app| match self.has_composite_parent(app) {
                Ok(true) => Some(Ok(app.clone())),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        for app in &composite_children {
            tracing::debug!("Skipping {}: parent directory is a kustomization", app);
            apps.remove(app);
        }

        tracing::info!("Discovered {} apps", apps.len());
        Ok(apps)
    }

    /// Directories `glob_levels` deep under `root`, relative to `root`.
    pub fn find_in(&self, root: &Path) -> Result<AppSet, DiscoveryError> {
        let mut apps = AppSet::new();
        if !exists(root)? {
            tracing::warn!("Environments root {} does not exist", root.display());
            return Ok(apps);
        }

        let root_str = root
            .to_str()
            .ok_or_else(|| DiscoveryError::NonUtf8(root.to_path_buf()))?;
        let mut pattern = glob::Pattern::escape(root_str);
        for _ in 0..self.glob_levels {
            pattern.push_str("/*");
        }
        tracing::debug!("Globbing {}", pattern);

        let entries = glob::glob(&pattern).map_err(|source| DiscoveryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            let path = entry?;
            let metadata = std::fs::metadata(&path).map_err(|source| DiscoveryError::Io {
                path: path.clone(),
                source,
            })?;
            if !metadata.is_dir() {
                tracing::debug!("Skipping non-directory {}", path.display());
                continue;
            }

            let outside = || DiscoveryError::OutsideRoot {
                path: path.clone(),
                root: root.to_path_buf(),
            };
            let relative = path.strip_prefix(root).map_err(|_| outside())?;
            let app = AppPath::from_relative(relative).ok_or_else(outside)?;
            tracing::debug!("Found app {} under {}", app, root.display());
            apps.add(app);
        }

        Ok(apps)
    }

    /// Whether the app's parent holds a kustomization in either branch.
    ///
    /// Both branches are consulted so an app removed from a composite parent is
    /// treated the same as one still inside it.
    fn has_composite_parent(&self, app: &AppPath) -> Result<bool, DiscoveryError> {
        for root in [&self.pr_root, &self.target_root] {
            let Some(parent) = root.join(app).parent().map(Path::to_path_buf) else {
                continue;
            };
            if is_kustomization_dir(&parent)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Whether `dir` directly contains one of [`KUSTOMIZATION_FILES`].
pub fn is_kustomization_dir(dir: &Path) -> Result<bool, DiscoveryError> {
    for name in KUSTOMIZATION_FILES {
        if exists(&dir.join(name))? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn exists(path: &Path) -> Result<bool, DiscoveryError> {
    path.try_exists().map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })
}
