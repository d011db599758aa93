//! Per-application change detection.
//!
//! Existence is checked first: an app missing from one branch is a change and
//! is never hashed. When both sides exist, each directory tree is reduced to a
//! SHA-256 fingerprint and the fingerprints are compared.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use kubediff_core::models::{AppPath, AppSet, ChangeReason, ChangeRecord};
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("error accessing {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("error walking {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },
}

pub struct ChangeDetector {
    pr_root: PathBuf,
    target_root: PathBuf,
}

impl ChangeDetector {
    pub fn new(pr_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            pr_root: pr_root.into(),
            target_root: target_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.pr_root(), config.target_root())
    }

    pub fn classify(&self, app: &AppPath) -> Result<ChangeRecord, DetectError> {
        let pr_dir = self.pr_root.join(app);
        let target_dir = self.target_root.join(app);

        if !exists(&pr_dir)? {
            tracing::debug!("{} does not exist", pr_dir.display());
            return Ok(ChangeRecord::new(app.clone(), ChangeReason::MissingInPr));
        }
        if !exists(&target_dir)? {
            tracing::debug!("{} does not exist", target_dir.display());
            return Ok(ChangeRecord::new(app.clone(), ChangeReason::MissingInTarget));
        }

        let reason = if fingerprint(&pr_dir)? != fingerprint(&target_dir)? {
            ChangeReason::ContentDiffers
        } else {
            ChangeReason::Unchanged
        };
        Ok(ChangeRecord::new(app.clone(), reason))
    }

    /// Classify every app, keeping only the changed ones (in set order).
    pub fn changed(&self, apps: &AppSet) -> Result<Vec<ChangeRecord>, DetectError> {
        let mut changed = Vec::new();
        for app in apps {
            let record = self.classify(app)?;
            if record.changed() {
                tracing::info!("Diff found for {} (reason: {})", record.app, record.reason);
                changed.push(record);
            }
        }
        tracing::info!("{} of {} apps changed", changed.len(), apps.len());
        Ok(changed)
    }
}

/// SHA-256 over a directory tree.
///
/// Entries are visited in file-name order. Each regular file contributes its
/// path relative to `root` and the digest of its bytes; each symlink
/// contributes its path and link target. Every variable-length field is length
/// prefixed, so no two distinct trees share an encoding. Directories contribute
/// nothing by themselves, so an empty directory does not count as a change.
pub fn fingerprint(root: &Path) -> Result<String, DetectError> {
    let mut hasher = Sha256::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| DetectError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        update_framed(&mut hasher, relative.to_string_lossy().as_bytes());

        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path()).map_err(|source| DetectError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            hasher.update(b"l");
            update_framed(&mut hasher, target.to_string_lossy().as_bytes());
        } else {
            let mut file = File::open(entry.path()).map_err(|source| DetectError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let mut content = Sha256::new();
            io::copy(&mut file, &mut content).map_err(|source| DetectError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            hasher.update(b"f");
            hasher.update(content.finalize());
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn update_framed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn exists(path: &Path) -> Result<bool, DetectError> {
    path.try_exists().map_err(|source| DetectError::Io {
        path: path.to_path_buf(),
        source,
    })
}
