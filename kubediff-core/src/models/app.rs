use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// An application directory, relative to the environments root.
///
/// Paths are always `/`-separated regardless of platform, so the same
/// application discovered under two different branch roots compares equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppPath(String);

impl AppPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build an app path from a path already relative to the environments root.
    ///
    /// Returns `None` when the path has no normal components or is not valid
    /// UTF-8.
    pub fn from_relative(path: &Path) -> Option<Self> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self(parts.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for AppPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<&str> for AppPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A set of application paths.
///
/// Iteration is in sorted order, which keeps chunk ordinals (and therefore
/// comment markers) reproducible between runs over the same trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSet(BTreeSet<AppPath>);

impl AppSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Returns `true` if it was not already present.
    pub fn add(&mut self, app: AppPath) -> bool {
        self.0.insert(app)
    }

    /// Every element present in either set. Neither input is modified.
    pub fn union(&self, other: &AppSet) -> AppSet {
        AppSet(self.0.union(&other.0).cloned().collect())
    }

    pub fn contains(&self, app: &AppPath) -> bool {
        self.0.contains(app)
    }

    pub fn remove(&mut self, app: &AppPath) -> bool {
        self.0.remove(app)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppPath> {
        self.0.iter()
    }
}

impl FromIterator<AppPath> for AppSet {
    fn from_iter<I: IntoIterator<Item = AppPath>>(iter: I) -> Self {
        AppSet(iter.into_iter().collect())
    }
}

impl IntoIterator for AppSet {
    type Item = AppPath;
    type IntoIter = std::collections::btree_set::IntoIter<AppPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AppSet {
    type Item = &'a AppPath;
    type IntoIter = std::collections::btree_set::Iter<'a, AppPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
