//! The Safe Zone: filesystem locations the agent may freely modify.

use std::path::Path;
use std::path::PathBuf;

use path_absolutize::Absolutize;

/// The union of the working directory and configured additional
/// directories. A path is inside the zone when its absolutized form lies
/// under at least one root.
///
/// Membership is decided lexically (`.`/`..` resolved, no symlink
/// traversal) so checks work for paths that do not exist yet.
#[derive(Debug, Clone)]
pub struct SafeZone {
    roots: Vec<PathBuf>,
    working_dir: PathBuf,
}

impl SafeZone {
    /// Create a zone rooted at the working directory.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            roots: vec![working_dir.clone()],
            working_dir,
        }
    }

    /// Add an additional directory to the zone.
    pub fn with_additional_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roots.push(dir.into());
        self
    }

    /// The working directory the zone is anchored at.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a possibly-relative path against the working directory into
    /// its absolutized form.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        path.absolutize_from(&self.working_dir)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.working_dir.join(path))
    }

    /// Whether the given path lies inside the zone.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let resolved = self.resolve(path);
        self.roots.iter().any(|root| {
            let root = root
                .absolutize_from(&self.working_dir)
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| root.clone());
            resolved.starts_with(&root)
        })
    }
}

#[cfg(test)]
#[path = "safe_zone.test.rs"]
mod tests;
